use chrono::{Duration, Utc};

use pubportal_auth::domain::repository::OtpStore;
use pubportal_auth::domain::types::{OTP_MAIL_SUBJECT, OtpEntry};
use pubportal_auth::error::AuthServiceError;
use pubportal_auth::infra::ledger::MemoryOtpStore;
use pubportal_auth::usecase::otp::{
    RequestCodeInput, RequestCodeUseCase, VerifyCodeInput, VerifyCodeUseCase,
};
use pubportal_domain::audit::AuditAction;
use pubportal_domain::email::Email;

use crate::helpers::{MockCredentialStore, MockMailer, test_sessions};

fn request_uc(store: &MemoryOtpStore, mailer: &MockMailer) -> RequestCodeUseCase<MemoryOtpStore, MockMailer> {
    RequestCodeUseCase {
        otp_store: store.clone(),
        mailer: mailer.clone(),
    }
}

fn verify_uc(
    store: &MemoryOtpStore,
    credentials: &MockCredentialStore,
) -> VerifyCodeUseCase<MemoryOtpStore, MockCredentialStore> {
    VerifyCodeUseCase {
        otp_store: store.clone(),
        credentials: credentials.clone(),
        sessions: test_sessions(),
    }
}

fn verify_input(email: &str, code: &str) -> VerifyCodeInput {
    VerifyCodeInput {
        email: email.to_owned(),
        code: code.to_owned(),
    }
}

// ── requestCode ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_store_code_under_lowercased_email_and_mail_it() {
    let store = MemoryOtpStore::default();
    let mailer = MockMailer::default();
    let now = Utc::now();

    request_uc(&store, &mailer)
        .execute_at(
            RequestCodeInput {
                email: "User@X.com".into(),
            },
            now,
        )
        .await
        .unwrap();

    let email = Email::normalize("user@x.com");
    let entry = store.pending(&email).expect("entry stored");
    assert_eq!(entry.code.len(), 6);
    assert!(entry.code.chars().all(|c| c.is_ascii_digit()));
    assert_eq!(entry.expires_at, now + Duration::minutes(5));

    let sent = mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, email);
    assert_eq!(sent[0].subject, OTP_MAIL_SUBJECT);
    assert!(sent[0].html.contains(&entry.code));
    assert!(!sent[0].html.contains("{{OTP}}"));
}

#[tokio::test]
async fn should_overwrite_pending_code_on_second_request() {
    let store = MemoryOtpStore::default();
    let mailer = MockMailer::default();
    let email = Email::normalize("user@x.com");
    store
        .put(&email, OtpEntry::issue("000001".into(), Utc::now()))
        .await
        .unwrap();

    request_uc(&store, &mailer)
        .execute(RequestCodeInput {
            email: "user@x.com".into(),
        })
        .await
        .unwrap();

    assert_eq!(store.len(), 1);
    let latest = store.pending(&email).unwrap();
    assert!(mailer.sent()[0].html.contains(&latest.code));
}

#[tokio::test]
async fn should_fail_with_delivery_error_and_keep_entry() {
    let store = MemoryOtpStore::default();
    let mailer = MockMailer::failing();

    let result = request_uc(&store, &mailer)
        .execute(RequestCodeInput {
            email: "user@x.com".into(),
        })
        .await;
    assert!(matches!(result, Err(AuthServiceError::Delivery)));

    // The stored code is still usable.
    let email = Email::normalize("user@x.com");
    let code = store.pending(&email).expect("entry kept").code;
    let credentials = MockCredentialStore::default();
    verify_uc(&store, &credentials)
        .execute(verify_input("user@x.com", &code))
        .await
        .unwrap();
}

// ── verifyCode ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_issue_session_for_matching_code() {
    let store = MemoryOtpStore::default();
    let credentials = MockCredentialStore::default();
    let now = Utc::now();
    store
        .put(&Email::normalize("user@x.com"), OtpEntry::issue("482913".into(), now))
        .await
        .unwrap();

    let output = verify_uc(&store, &credentials)
        .execute_at(verify_input("user@x.com", "482913"), now)
        .await
        .unwrap();

    assert_eq!(output.email.as_str(), "user@x.com");
    let identity = test_sessions().validate(&output.session.token).unwrap();
    assert_eq!(identity.user_email.as_str(), "user@x.com");
    assert_eq!(output.session.expires_at, now + Duration::days(30));

    let audit = credentials.audit_actions();
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].1, AuditAction::Login);
    assert_eq!(audit[0].2, "User logged in via OTP");
}

#[tokio::test]
async fn should_match_email_case_insensitively() {
    let store = MemoryOtpStore::default();
    let credentials = MockCredentialStore::default();
    let mailer = MockMailer::default();

    request_uc(&store, &mailer)
        .execute(RequestCodeInput {
            email: "Faculty@NRI.edu".into(),
        })
        .await
        .unwrap();
    let code = store.pending(&Email::normalize("faculty@nri.edu")).unwrap().code;

    let output = verify_uc(&store, &credentials)
        .execute(verify_input("FACULTY@nri.EDU", &code))
        .await
        .unwrap();
    assert_eq!(output.email.as_str(), "faculty@nri.edu");
}

#[tokio::test]
async fn should_succeed_exactly_once() {
    let store = MemoryOtpStore::default();
    let credentials = MockCredentialStore::default();
    store
        .put(&Email::normalize("user@x.com"), OtpEntry::issue("482913".into(), Utc::now()))
        .await
        .unwrap();
    let uc = verify_uc(&store, &credentials);

    uc.execute(verify_input("user@x.com", "482913")).await.unwrap();
    let second = uc.execute(verify_input("user@x.com", "482913")).await;
    assert!(matches!(second, Err(AuthServiceError::OtpNotFound)));
}

#[tokio::test]
async fn should_fail_not_found_when_never_requested() {
    let store = MemoryOtpStore::default();
    let credentials = MockCredentialStore::default();

    let result = verify_uc(&store, &credentials)
        .execute(verify_input("nobody@x.com", "123456"))
        .await;
    assert!(matches!(result, Err(AuthServiceError::OtpNotFound)));
    assert!(credentials.audit_actions().is_empty());
}

#[tokio::test]
async fn should_fail_expired_after_five_minutes_and_forget_entry() {
    let store = MemoryOtpStore::default();
    let credentials = MockCredentialStore::default();
    let issued = Utc::now();
    store
        .put(&Email::normalize("user@x.com"), OtpEntry::issue("482913".into(), issued))
        .await
        .unwrap();
    let uc = verify_uc(&store, &credentials);
    let late = issued + Duration::minutes(5) + Duration::seconds(1);

    let first = uc.execute_at(verify_input("user@x.com", "482913"), late).await;
    assert!(matches!(first, Err(AuthServiceError::OtpExpired)));

    let again = uc.execute_at(verify_input("user@x.com", "482913"), late).await;
    assert!(matches!(again, Err(AuthServiceError::OtpNotFound)));
}

#[tokio::test]
async fn should_fail_expired_when_reaper_ran_just_after_expiry() {
    let store = MemoryOtpStore::default();
    let credentials = MockCredentialStore::default();
    let issued = Utc::now();
    store
        .put(&Email::normalize("user@x.com"), OtpEntry::issue("482913".into(), issued))
        .await
        .unwrap();
    let late = issued + Duration::seconds(301);

    store.purge_expired(late).await.unwrap();
    let result = verify_uc(&store, &credentials)
        .execute_at(verify_input("user@x.com", "482913"), late)
        .await;
    assert!(matches!(result, Err(AuthServiceError::OtpExpired)));
}

#[tokio::test]
async fn should_fail_expired_for_injected_stale_entry() {
    let store = MemoryOtpStore::default();
    let credentials = MockCredentialStore::default();
    store
        .put(
            &Email::normalize("user@x.com"),
            OtpEntry::issue("482913".into(), Utc::now() - Duration::minutes(6)),
        )
        .await
        .unwrap();

    let result = verify_uc(&store, &credentials)
        .execute(verify_input("user@x.com", "482913"))
        .await;
    assert!(matches!(result, Err(AuthServiceError::OtpExpired)));
}

#[tokio::test]
async fn should_keep_entry_after_mismatch_and_accept_correct_code() {
    let store = MemoryOtpStore::default();
    let credentials = MockCredentialStore::default();
    store
        .put(&Email::normalize("user@x.com"), OtpEntry::issue("482913".into(), Utc::now()))
        .await
        .unwrap();
    let uc = verify_uc(&store, &credentials);

    let wrong = uc.execute(verify_input("user@x.com", "111111")).await;
    assert!(matches!(wrong, Err(AuthServiceError::OtpMismatch)));

    uc.execute(verify_input("user@x.com", "482913")).await.unwrap();
}

#[tokio::test]
async fn should_compare_codes_as_exact_strings() {
    let store = MemoryOtpStore::default();
    let credentials = MockCredentialStore::default();
    store
        .put(&Email::normalize("user@x.com"), OtpEntry::issue("482913".into(), Utc::now()))
        .await
        .unwrap();

    let padded = verify_uc(&store, &credentials)
        .execute(verify_input("user@x.com", " 482913"))
        .await;
    assert!(matches!(padded, Err(AuthServiceError::OtpMismatch)));
}

#[tokio::test]
async fn should_still_verify_when_audit_log_fails() {
    let store = MemoryOtpStore::default();
    let credentials = MockCredentialStore::failing_audit();
    store
        .put(&Email::normalize("user@x.com"), OtpEntry::issue("482913".into(), Utc::now()))
        .await
        .unwrap();

    let output = verify_uc(&store, &credentials)
        .execute(verify_input("user@x.com", "482913"))
        .await
        .unwrap();
    assert!(!output.session.token.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn should_let_only_one_of_two_racing_verifications_win() {
    let store = MemoryOtpStore::default();
    let credentials = MockCredentialStore::default();
    store
        .put(&Email::normalize("user@x.com"), OtpEntry::issue("482913".into(), Utc::now()))
        .await
        .unwrap();

    let a = {
        let uc = verify_uc(&store, &credentials);
        tokio::spawn(async move { uc.execute(verify_input("user@x.com", "482913")).await })
    };
    let b = {
        let uc = verify_uc(&store, &credentials);
        tokio::spawn(async move { uc.execute(verify_input("user@x.com", "482913")).await })
    };
    let results = [a.await.unwrap(), b.await.unwrap()];

    let won = results.iter().filter(|r| r.is_ok()).count();
    let not_found = results
        .iter()
        .filter(|r| matches!(r, Err(AuthServiceError::OtpNotFound)))
        .count();
    assert_eq!((won, not_found), (1, 1));
    assert_eq!(credentials.audit_actions().len(), 1);
}
