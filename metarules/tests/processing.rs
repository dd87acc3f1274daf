//! Rule processing through the public handler API.
//!
//! Covers predicate matching, input binding, ordering, failure handling and
//! status validation as seen by a build that registers rules and then
//! resolves modules.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::bail;
use parking_lot::Mutex;

use metarules::apply::process_all;
use metarules::core::error::ProcessError;
use metarules::core::inputs::{InputType, RuleInput};
use metarules::handler::{ComponentMetadataHandler, ComponentMetadataProcessor};
use metarules::test_support::{ivy_module, maven_module};

#[test]
fn unscoped_rule_runs_for_every_module() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&seen);
    let mut handler = ComponentMetadataHandler::new();
    handler.all_fn(move |details| {
        recorder.lock().push(details.id().to_string());
        Ok(())
    });

    for (group, name) in [("org", "a"), ("com", "b"), ("net", "c")] {
        let mut metadata = maven_module(group, name, "1.0", "integration");
        handler.process_metadata(&mut metadata).expect("process");
    }
    assert_eq!(*seen.lock(), vec!["org:a:1.0", "com:b:1.0", "net:c:1.0"]);
}

#[test]
fn scoped_rule_requires_exact_group_and_name() {
    let mut handler = ComponentMetadataHandler::new();
    let mut map = BTreeMap::new();
    map.insert("group".to_string(), "org".to_string());
    map.insert("name".to_string(), "lib".to_string());
    handler
        .with_module_fn(map, |details| {
            details.set_status("release");
            Ok(())
        })
        .expect("register");

    let mut exact = maven_module("org", "lib", "3.1", "integration");
    let mut prefix = maven_module("org", "lib-extra", "3.1", "integration");
    let mut other_group = maven_module("org.sub", "lib", "3.1", "integration");
    for metadata in [&mut exact, &mut prefix, &mut other_group] {
        handler.process_metadata(metadata).expect("process");
    }
    assert_eq!(exact.status, "release");
    assert_eq!(prefix.status, "integration");
    assert_eq!(other_group.status, "integration");
}

#[test]
fn ivy_rule_is_skipped_for_maven_metadata() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let mut handler = ComponentMetadataHandler::new();
    let action = handler
        .adapter()
        .from_fn(&[InputType::IVY_DESCRIPTOR], move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .expect("action");
    handler.all(action);

    let mut metadata = maven_module("org", "lib", "1.0", "milestone");
    handler.process_metadata(&mut metadata).expect("process");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(metadata.status, "milestone");
}

#[test]
fn ivy_rule_receives_descriptor_exactly_once() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&seen);
    let mut handler = ComponentMetadataHandler::new();
    let action = handler
        .adapter()
        .from_fn(&[InputType::IVY_DESCRIPTOR], move |_, inputs: &[RuleInput]| {
            let descriptor = inputs[0].as_ivy_descriptor().expect("ivy descriptor").clone();
            recorder.lock().push(descriptor);
            Ok(())
        })
        .expect("action");
    handler.all(action);

    let mut metadata = ivy_module("org", "lib", "1.0", "integration", &[("a", "1")], Some("main"));
    handler.process_metadata(&mut metadata).expect("process");

    let seen = seen.lock();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].extra_info.get("a").map(String::as_str), Some("1"));
    assert_eq!(seen[0].branch.as_deref(), Some("main"));
    assert_eq!(seen[0].ivy_status, "integration");
}

#[test]
fn rules_run_in_registration_order() {
    let mut handler = ComponentMetadataHandler::new();
    handler
        .all_fn(|details| {
            details.set_status("milestone");
            Ok(())
        })
        .all_fn(|details| {
            let next = format!("{}-seen", details.status());
            details.set_status_scheme(["integration", "milestone-seen"]);
            details.set_status(next);
            Ok(())
        });

    let mut metadata = maven_module("org", "lib", "1.0", "integration");
    handler.process_metadata(&mut metadata).expect("process");
    assert_eq!(metadata.status, "milestone-seen");
}

#[test]
fn status_outside_scheme_is_rejected() {
    let mut handler = ComponentMetadataHandler::new();
    handler.all_fn(|details| {
        details.set_status("bogus");
        Ok(())
    });

    let mut metadata = maven_module("org", "lib", "1.0", "integration");
    let err = handler.process_metadata(&mut metadata).expect_err("should fail");
    assert!(matches!(err, ProcessError::InvalidStatus { .. }));
    assert_eq!(
        err.to_string(),
        "Unexpected status 'bogus' specified for org:lib:1.0. \
         Expected one of: [integration, milestone, release]"
    );
}

#[test]
fn failing_rule_stops_later_rules_and_names_module() {
    let later = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&later);
    let mut handler = ComponentMetadataHandler::new();
    handler
        .all_fn(|_| bail!("repository offline"))
        .all_fn(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

    let mut metadata = maven_module("org", "lib", "1.0", "integration");
    let err = handler.process_metadata(&mut metadata).expect_err("should fail");
    assert_eq!(
        err.to_string(),
        "Could not apply component metadata rule for org:lib:1.0."
    );
    let cause = std::error::Error::source(&err).expect("cause");
    assert_eq!(cause.to_string(), "repository offline");
    assert_eq!(later.load(Ordering::SeqCst), 0);
}

#[test]
fn registering_same_action_twice_runs_it_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let mut handler = ComponentMetadataHandler::new();
    let action = handler
        .adapter()
        .from_fn(&[], move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .expect("action");
    handler.all(Arc::clone(&action)).all(Arc::clone(&action));
    assert_eq!(handler.len(), 1);

    let mut metadata = maven_module("org", "lib", "1.0", "integration");
    handler.process_metadata(&mut metadata).expect("process");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn no_rules_still_validates_status() {
    let handler = ComponentMetadataHandler::new();

    let mut valid = maven_module("org", "lib", "1.0", "milestone");
    handler.process_metadata(&mut valid).expect("process");
    assert_eq!(valid.status, "milestone");

    let mut invalid = maven_module("org", "lib", "1.0", "snapshot");
    let err = handler.process_metadata(&mut invalid).expect_err("should fail");
    assert!(matches!(err, ProcessError::InvalidStatus { .. }));
}

#[test]
fn shared_handler_processes_modules_concurrently() {
    let mut handler = ComponentMetadataHandler::new();
    handler
        .with_module_fn("org:odd", |details| {
            details.set_changing(true);
            Ok(())
        })
        .expect("register")
        .all_fn(|details| {
            details.set_status("release");
            Ok(())
        });

    let modules: Vec<(PathBuf, _)> = (0..64)
        .map(|i| {
            let name = if i % 2 == 1 { "odd" } else { "even" };
            let metadata = maven_module("org", name, &i.to_string(), "integration");
            (PathBuf::from(format!("{i}.json")), metadata)
        })
        .collect();

    let outcomes = process_all(&handler, modules);
    assert_eq!(outcomes.len(), 64);
    for (i, outcome) in outcomes.iter().enumerate() {
        assert_eq!(outcome.path, PathBuf::from(format!("{i}.json")));
        let metadata = outcome.result.as_ref().expect("processed");
        assert_eq!(metadata.status, "release");
        assert_eq!(metadata.changing, i % 2 == 1);
    }
}
