mod common;

use common::{filled_form, today, MACHINE_CODE, PERMANENT_CODE, SECRET};
use ibase_keygen::{
    CodeDeriver, Digester, ExpiryOption, Field, FormEvent, FormState, KeygenError, KeygenResult,
    Sha256Digester, StatusKind, Validator, AGGREGATE_ERROR_MESSAGE, DERIVATION_ERROR_MESSAGE,
    SUCCESS_MESSAGE,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Counts calls, then delegates to SHA-256.
struct CountingDigester(Arc<AtomicUsize>);

impl Digester for CountingDigester {
    fn name(&self) -> &'static str {
        "counting"
    }

    fn digest(&self, source: &[u8]) -> KeygenResult<String> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Sha256Digester.digest(source)
    }
}

struct FailingDigester;

impl Digester for FailingDigester {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn digest(&self, _source: &[u8]) -> KeygenResult<String> {
        Err(KeygenError::DerivationFailed("digest unavailable".into()))
    }
}

fn counting_deriver() -> (CodeDeriver, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let deriver = CodeDeriver::with_digester(Box::new(CountingDigester(calls.clone())));
    (deriver, calls)
}

// ── Successful submit ────────────────────────────────────────────

#[test]
fn permanent_end_to_end() {
    let v = Validator::default();
    let state = filled_form(&v).submit(&v, &CodeDeriver::new(), today());

    let result = state.result().expect("result");
    assert_eq!(result.code.as_str(), PERMANENT_CODE);
    assert_eq!(result.device_identifier, MACHINE_CODE);
    assert_eq!(result.secret_key, SECRET);
    assert_eq!(result.expires_on, None);
    assert!(result.expiry_label.contains("Permanent"));

    let status = state.status().expect("status");
    assert_eq!(status.kind, StatusKind::Success);
    assert_eq!(status.message, SUCCESS_MESSAGE);
}

#[test]
fn year_end_to_end() {
    let v = Validator::default();
    let state = filled_form(&v)
        .apply(FormEvent::SelectExpiry(ExpiryOption::Year), &v, today())
        .submit(&v, &CodeDeriver::new(), today());

    let result = state.result().expect("result");
    assert_eq!(result.code.as_str(), "4C9A-C040-92E8-6BE7");
    assert_eq!(result.expiry_label, "2027-10-17 (valid for one year)");
}

#[test]
fn secret_is_trimmed_before_hashing() {
    let v = Validator::default();
    let state = filled_form(&v)
        .apply(FormEvent::edit(Field::SecretKey, "  mysecretkey \t"), &v, today())
        .submit(&v, &CodeDeriver::new(), today());

    let result = state.result().expect("result");
    assert_eq!(result.secret_key, SECRET);
    assert_eq!(result.code.as_str(), PERMANENT_CODE);
}

#[test]
fn resubmitting_is_idempotent() {
    let v = Validator::default();
    let deriver = CodeDeriver::new();
    let first = filled_form(&v).submit(&v, &deriver, today());
    let code = first.result().unwrap().code.clone();

    let second = first.submit(&v, &deriver, today());
    assert_eq!(second.result().unwrap().code, code);
}

// ── Validation failure ───────────────────────────────────────────

#[test]
fn empty_secret_blocks_derivation() {
    let v = Validator::default();
    let (deriver, calls) = counting_deriver();
    let state = FormState::new()
        .apply(FormEvent::edit(Field::MachineCode, MACHINE_CODE), &v, today())
        .submit(&v, &deriver, today());

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(state.result().is_none());
    assert!(state.errors().contains(Field::SecretKey));
    let status = state.status().expect("status");
    assert_eq!(status.kind, StatusKind::Error);
    assert_eq!(status.message, AGGREGATE_ERROR_MESSAGE);
}

#[test]
fn submit_validates_untouched_fields() {
    let v = Validator::default();
    let (state, pending) = FormState::new()
        .apply(FormEvent::SelectExpiry(ExpiryOption::Custom), &v, today())
        .begin_submit(&v, today());

    assert!(pending.is_none());
    assert!(state.errors().contains(Field::MachineCode));
    assert!(state.errors().contains(Field::SecretKey));
    assert!(state.errors().contains(Field::CustomDate));
}

#[test]
fn invalid_submit_clears_previous_result() {
    let v = Validator::default();
    let deriver = CodeDeriver::new();
    let state = filled_form(&v).submit(&v, &deriver, today());
    assert!(state.result().is_some());

    let state = state
        .apply(FormEvent::edit(Field::SecretKey, "short"), &v, today())
        .submit(&v, &deriver, today());
    assert!(state.result().is_none());
}

#[test]
fn successful_submit_counts_one_derivation() {
    let v = Validator::default();
    let (deriver, calls) = counting_deriver();
    let _ = filled_form(&v).submit(&v, &deriver, today());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

// ── Derivation failure ───────────────────────────────────────────

#[test]
fn derivation_failure_clears_result() {
    let v = Validator::default();
    let state = filled_form(&v).submit(&v, &CodeDeriver::new(), today());
    assert!(state.result().is_some());

    let failing = CodeDeriver::with_digester(Box::new(FailingDigester));
    let state = state.submit(&v, &failing, today());
    assert!(state.result().is_none());
    let status = state.status().expect("status");
    assert_eq!(status.kind, StatusKind::Error);
    assert_eq!(status.message, DERIVATION_ERROR_MESSAGE);
}

// ── Sequencing ───────────────────────────────────────────────────

#[test]
fn stale_outcome_is_dropped() {
    let v = Validator::default();
    let deriver = CodeDeriver::new();

    let (state, first) = filled_form(&v).begin_submit(&v, today());
    let first = first.expect("first submission");
    let (state, second) = state
        .apply(FormEvent::edit(Field::SecretKey, "othersecret"), &v, today())
        .begin_submit(&v, today());
    let second = second.expect("second submission");
    assert!(second.generation() > first.generation());

    let state = state.complete(second.run(&deriver));
    let fresh = state.result().unwrap().clone();
    assert_eq!(fresh.secret_key, "othersecret");

    let state = state.complete(first.run(&deriver));
    assert_eq!(state.result(), Some(&fresh));
}

#[test]
fn outcome_after_reset_is_dropped() {
    let v = Validator::default();
    let (state, pending) = filled_form(&v).begin_submit(&v, today());
    let pending = pending.expect("submission");

    let state = state.apply(FormEvent::Reset, &v, today());
    let state = state.complete(pending.run(&CodeDeriver::new()));
    assert!(state.result().is_none());
    assert!(state.status().is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn overlapping_submissions_keep_latest() {
    let v = Validator::default();
    let deriver = Arc::new(CodeDeriver::new());

    let (state, older) = filled_form(&v).begin_submit(&v, today());
    let older = older.expect("older submission");
    let (state, newer) = state
        .apply(FormEvent::edit(Field::SecretKey, "newersecret"), &v, today())
        .begin_submit(&v, today());
    let newer = newer.expect("newer submission");

    let d = deriver.clone();
    let newer_task = tokio::spawn(async move { newer.run(&d) });
    let d = deriver.clone();
    let older_task = tokio::spawn(async move { older.run(&d) });

    // Newer finishes first, older arrives late.
    let state = state.complete(newer_task.await.unwrap());
    let state = state.complete(older_task.await.unwrap());

    assert_eq!(state.result().unwrap().secret_key, "newersecret");
}
