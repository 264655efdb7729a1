//! End-to-end boxing through the public API.

use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::{Value, json};
use tempfile::TempDir;

use boxit_core::{
    BoxitConfig, Deferred, Execution, ExecutionMode, Invoke, Properties, Record, RecordError,
    ResultBox, Thrown, bind, boxify, boxify_async, boxify_dynamic, boxify_object,
    boxify_record_with, execute, wrap,
};

#[derive(Debug, PartialEq)]
enum LedgerError {
    Frozen,
    Overdrawn(u64),
}

#[derive(Debug)]
struct Ledger {
    owner: String,
    total: AtomicU64,
    frozen: bool,
}

impl Ledger {
    fn new(owner: &str, total: u64) -> Self {
        Self {
            owner: owner.to_string(),
            total: AtomicU64::new(total),
            frozen: false,
        }
    }

    fn total(&self) -> u64 {
        self.total.load(Ordering::SeqCst)
    }

    fn debit(&self, amount: u64) -> Result<u64, LedgerError> {
        if self.frozen {
            return Err(LedgerError::Frozen);
        }
        let total = self.total();
        if amount > total {
            return Err(LedgerError::Overdrawn(amount - total));
        }
        self.total.store(total - amount, Ordering::SeqCst);
        Ok(total - amount)
    }

    async fn settle(&self, fee: u64) -> Result<u64, LedgerError> {
        tokio::task::yield_now().await;
        self.debit(fee)
    }
}

boxify_object! {
    struct BoxedLedger for Ledger {
        fn total(&self) -> u64;
        fn debit(&self, amount: u64) -> Result<u64, LedgerError>;
        async fn settle(&self, fee: u64) -> Result<u64, LedgerError>;
    }
}

fn expect_ready<T>(execution: Execution<T>) -> ResultBox<T> {
    match execution.try_ready() {
        Ok(boxed) => boxed,
        Err(_) => panic!("expected an immediate result"),
    }
}

#[test]
fn bound_function_and_facade_agree() {
    let shared = Arc::new(Ledger::new("ada", 50));
    let debit = boxify(bind(Arc::clone(&shared), Ledger::debit));
    let facade = BoxedLedger::from_arc(Arc::clone(&shared));

    assert_eq!(debit.call((10,)).into_value(), Some(40));
    assert_eq!(facade.debit(10).into_value(), Some(30));

    let bound_err = debit.call((100,)).into_error().unwrap();
    let facade_err = facade.debit(100).into_error().unwrap();
    assert_eq!(
        bound_err.downcast::<LedgerError>().ok(),
        Some(LedgerError::Overdrawn(70))
    );
    assert_eq!(
        facade_err.downcast::<LedgerError>().ok(),
        Some(LedgerError::Overdrawn(70))
    );
    assert_eq!(shared.total(), 30);
}

#[test]
fn facade_reads_fields_of_receiver() {
    let facade = BoxedLedger::new(Ledger {
        frozen: true,
        ..Ledger::new("grace", 1)
    });
    assert_eq!(facade.owner, "grace");
    assert!(facade.frozen);
    let frozen = facade.debit(1).into_error().unwrap();
    assert!(frozen.is::<LedgerError>());
}

#[tokio::test]
async fn async_facade_and_async_wrapper_settle_later() {
    let shared = Arc::new(Ledger::new("lin", 5));
    let facade = BoxedLedger::from_arc(Arc::clone(&shared));
    assert_eq!(facade.settle(2).await.into_value(), Some(3));

    let settle = boxify_async(move |fee: u64| {
        let ledger = Arc::clone(&shared);
        async move { ledger.settle(fee).await }
    });
    let refused = settle.call((9,)).await;
    assert!(refused.is_failure());
    assert_eq!(settle.mode(), ExecutionMode::Async);
}

#[tokio::test]
async fn dynamic_wrapper_decides_per_call() {
    let lookup = boxify_dynamic(|cached: bool| {
        if cached {
            Deferred::new(async { Ok::<_, String>(json!("fresh")) })
        } else {
            Deferred::new(async { Err::<Value, _>("miss".to_string()) })
        }
    });
    let fetched = lookup.call((true,));
    assert!(fetched.is_deferred());
    assert_eq!(fetched.await.into_value(), Some(json!("fresh")));

    let sync_raise = boxify_dynamic(|n: i32| -> Result<i32, String> {
        if n < 0 {
            Err("negative".into())
        } else {
            Ok(n)
        }
    });
    let boxed = expect_ready(sync_raise.call((-1,)));
    assert_eq!(boxed.error().and_then(Thrown::message), Some("negative"));
}

#[test]
fn wrapped_callables_compose_without_double_boxing() {
    let halve = wrap(|n: u32| -> Result<u32, String> {
        if n % 2 == 0 {
            Ok(n / 2)
        } else {
            Err(format!("{n} is odd"))
        }
    });
    let twice = boxify(halve.clone());

    assert_eq!(halve.invoke((8,)).into_value(), Some(4));
    assert_eq!(twice.call((8,)).into_value(), Some(4));
    let odd = twice.call((3,)).into_error().unwrap();
    assert_eq!(odd.downcast::<String>().ok().as_deref(), Some("3 is odd"));
}

#[test]
fn panics_become_failures() {
    let boxed = expect_ready(execute(|| -> u8 { panic!("boom") }));
    let error: &Thrown = boxed.error().unwrap();
    assert_eq!(error.message(), Some("boom"));
}

#[test]
fn record_boxing_follows_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        "[executor]\ntrace = \"off\"\n\n[record]\nexcluded_keys = [\"constructor\", \"reset\"]\n",
    )
    .unwrap();
    let config = BoxitConfig::load_from(&path).unwrap();

    let base = Properties::<Ledger>::new()
        .method("constructor", |_: &Ledger, _| json!(null))
        .method("reset", |ledger: &Ledger, _| {
            ledger.total.store(0, Ordering::SeqCst);
            json!(0)
        })
        .method("debit", |ledger: &Ledger, args: Vec<Value>| {
            let amount = args.first().and_then(Value::as_u64).unwrap_or(0);
            ledger.debit(amount).map(|left| json!(left))
        });
    let record = Record::new(Arc::new(Ledger::new("ada", 9)))
        .value("currency", "EUR")
        .inherit(base);
    let boxed = boxify_record_with(record, None, &config);

    assert_eq!(boxed.keys().collect::<Vec<_>>(), vec!["currency", "debit"]);
    assert_eq!(boxed.value("currency"), Some(&json!("EUR")));

    let left = expect_ready(boxed.call("debit", vec![json!(4)]).unwrap());
    assert_eq!(left.into_value(), Some(json!(5)));
    assert_eq!(
        boxed.call("reset", vec![]).err(),
        Some(RecordError::Missing("reset".to_string()))
    );
    assert_eq!(
        boxed.call("currency", vec![]).err(),
        Some(RecordError::NotCallable("currency".to_string()))
    );
}

#[test]
fn wrap_accepts_records() {
    let record = Record::new(Arc::new(Ledger::new("kay", 3)))
        .method("owner", |ledger: &Ledger, _| json!(ledger.owner.clone()));
    let boxed = wrap(record);
    let owner = expect_ready(boxed.call("owner", vec![]).unwrap());
    assert_eq!(owner.into_value(), Some(json!("kay")));
}

#[test]
fn results_serialize_with_ok_tag() {
    let ok = boxify(|| 7_u8).call(());
    let failed = boxify(|| Err::<u8, _>("nope")).call(());
    assert_eq!(
        serde_json::to_value(&ok).unwrap(),
        json!({ "ok": true, "value": 7 })
    );
    assert_eq!(
        serde_json::to_value(&failed).unwrap(),
        json!({ "ok": false, "error": "nope" })
    );
}
