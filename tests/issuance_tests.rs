// tests/issuance_tests.rs
//! Issuance: id shape, verification links, collision retry

mod support;
use support::{fake_qr, policy, seed_exam, store};

use std::cell::Cell;

use certificate_vault::config::IssuancePolicy;
use certificate_vault::issuance::issue_certificate_with;
use certificate_vault::records::NewCertificate;
use certificate_vault::{
    issue_certificate, verify_certificate, CertificateId, CertificateStore, CoreError, Rejection,
};

fn request(user_ref: &str, exam_id: i64) -> NewCertificate {
    NewCertificate {
        user_ref: user_ref.into(),
        exam_result_ref: exam_id.to_string(),
    }
}

fn id(hex: &str) -> CertificateId {
    CertificateId::parse(hex).unwrap()
}

#[test]
fn issues_a_verifiable_certificate() {
    let store = store();
    let exam = seed_exam(&store, "student-1", &[("math", 92.0), ("physics", 88.0)]);

    let issued = issue_certificate(&store, &fake_qr, &policy(), &request("student-1", exam.id)).unwrap();

    let certificate_id = issued.record.certificate_id.as_str();
    assert_eq!(certificate_id.len(), 16);
    assert!(certificate_id.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')));
    assert!(!issued.record.revoked);
    assert_eq!(
        issued.verification_url,
        format!("https://certs.example.org/verify-certificate/{certificate_id}")
    );
    assert_eq!(issued.qr_code, format!("qr:{}", issued.verification_url));

    let view = verify_certificate(&store, certificate_id).unwrap();
    assert_eq!(view.certificate_id, issued.record.certificate_id);
    assert_eq!(view.user_ref, "student-1");
    let attached = view.exam_result.expect("exam result attached");
    assert_eq!(attached.id, exam.id);
    assert_eq!(attached.scores, exam.scores);
}

#[test]
fn unknown_exam_result_is_not_found_and_issues_nothing() {
    let store = store();

    for exam_ref in ["999", "not-an-id"] {
        let err = issue_certificate(
            &store,
            &fake_qr,
            &policy(),
            &NewCertificate {
                user_ref: "student-1".into(),
                exam_result_ref: exam_ref.into(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::NotFound), "{err:?}");
    }

    assert!(store.certificates_for_user("student-1").unwrap().is_empty());
}

#[test]
fn collision_is_retried_with_a_fresh_id() {
    let store = store();
    let exam = seed_exam(&store, "student-1", &[("math", 75.0)]);

    issue_certificate_with(&store, &fake_qr, &policy(), &request("student-1", exam.id), || {
        id("00000000000000aa")
    })
    .unwrap();

    let mut ids = vec![id("00000000000000bb"), id("00000000000000aa")];
    let issued = issue_certificate_with(&store, &fake_qr, &policy(), &request("student-2", exam.id), || {
        ids.pop().unwrap()
    })
    .unwrap();

    assert_eq!(issued.record.certificate_id, id("00000000000000bb"));
    assert_eq!(issued.record.user_ref, "student-2");

    // the original holder is untouched
    let first = store.find_by_certificate_id("00000000000000aa").unwrap().unwrap();
    assert_eq!(first.user_ref, "student-1");
}

#[test]
fn persistent_collisions_fail_after_the_attempt_bound() {
    let store = store();
    let exam = seed_exam(&store, "student-1", &[("math", 75.0)]);
    issue_certificate_with(&store, &fake_qr, &policy(), &request("student-1", exam.id), || {
        id("00000000000000aa")
    })
    .unwrap();

    let draws = Cell::new(0u32);
    let tight = IssuancePolicy {
        max_attempts: 3,
        ..policy()
    };
    let err = issue_certificate_with(&store, &fake_qr, &tight, &request("student-2", exam.id), || {
        draws.set(draws.get() + 1);
        id("00000000000000aa")
    })
    .unwrap_err();

    assert!(matches!(err, CoreError::IssuanceFailed { attempts: 3 }), "{err:?}");
    assert_eq!(draws.get(), 3);
    assert_eq!(err.rejection(), Rejection::ServerFault);
    assert_eq!(err.public_message(), "Internal server error");
    assert!(store.certificates_for_user("student-2").unwrap().is_empty());
}

#[test]
fn each_issuance_gets_its_own_id() {
    let store = store();
    let exam = seed_exam(&store, "student-1", &[("math", 75.0)]);

    let a = issue_certificate(&store, &fake_qr, &policy(), &request("student-1", exam.id)).unwrap();
    let b = issue_certificate(&store, &fake_qr, &policy(), &request("student-1", exam.id)).unwrap();

    assert_ne!(a.record.certificate_id, b.record.certificate_id);
    assert_eq!(store.certificates_for_user("student-1").unwrap().len(), 2);
}
