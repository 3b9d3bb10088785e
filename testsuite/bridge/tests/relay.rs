// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::{
	Arc,
	atomic::{AtomicUsize, Ordering},
};

use tether::{Bridge, Exception, MethodToken, NativeLibrary, Value};
use tether_testing::{recorder::RecorderModule, session};

struct Recorder {
	bridge: Bridge,
	module: RecorderModule,
	record: MethodToken,
	call_back: MethodToken,
	call_optional: MethodToken,
}

fn recorder_session() -> Recorder {
	let module = RecorderModule::new();
	let bridge = session(NativeLibrary::new().with_module(module.clone()));
	let token = bridge.resolve_module(RecorderModule::NAME);
	Recorder {
		record: bridge.resolve_method(token, "record"),
		call_back: bridge.resolve_method(token, "call_back"),
		call_optional: bridge.resolve_method(token, "call_optional"),
		module,
		bridge,
	}
}

#[test]
fn test_arguments_pop_in_declared_order() {
	let recorder = recorder_session();
	recorder.bridge.push(true);
	recorder.bridge.push("b");
	recorder.bridge.push(7_i32);
	recorder.bridge.invoke(recorder.record);
	assert_eq!(recorder.module.entries(), vec!["record 7 b true"]);
	assert_eq!(recorder.bridge.channel_depth(), 0);
}

#[test]
fn test_calls_run_in_program_order() {
	let recorder = recorder_session();
	for i in 0..3 {
		recorder.bridge.push(false);
		recorder.bridge.push(format!("n{}", i));
		recorder.bridge.push(i);
		recorder.bridge.invoke(recorder.record);
	}
	assert_eq!(recorder.module.entries(), vec!["record 0 n0 false", "record 1 n1 false", "record 2 n2 false"]);
}

#[test]
fn test_callback_result_reaches_native() {
	let recorder = recorder_session();
	let double = recorder.bridge.register_client_func(|bridge| {
		let value: i64 = bridge.pop();
		bridge.push(value * 2);
		Ok(())
	});

	recorder.bridge.push(21_i64);
	recorder.bridge.push(double);
	recorder.bridge.invoke(recorder.call_back);
	assert_eq!(recorder.bridge.pop::<i64>(), 42);
	assert_eq!(recorder.module.entries(), vec!["call_back enter depth=1", "call_back leave result=42"]);

	// the native side released the callback once it was done with it
	assert!(recorder.bridge.dump_tables().client.is_empty());
}

#[test]
fn test_reentrant_native_call_from_callback() {
	let recorder = recorder_session();
	let call_back = recorder.call_back;
	let outer = recorder.bridge.register_client_func(move |bridge: &Bridge| {
		assert!(bridge.in_native_call());
		let value: i64 = bridge.pop();
		let inner = bridge.register_client_func(|bridge| {
			let value: i64 = bridge.pop();
			bridge.push(value + 1);
			Ok(())
		});
		bridge.push(value * 10);
		bridge.push(inner);
		bridge.invoke_with_exception_capture(call_back)?;
		let inner_result: i64 = bridge.pop();
		bridge.push(inner_result);
		Ok(())
	});

	recorder.bridge.push(4_i64);
	recorder.bridge.push(outer);
	recorder.bridge.invoke(recorder.call_back);

	assert_eq!(recorder.bridge.pop::<i64>(), 41);
	assert_eq!(
		recorder.module.entries(),
		vec![
			"call_back enter depth=1",
			"call_back enter depth=2",
			"call_back leave result=41",
			"call_back leave result=41",
		]
	);
	assert_eq!(recorder.bridge.call_depth(), 0);
	assert!(recorder.bridge.dump_tables().client.is_empty());
}

#[test]
fn test_callback_exception_unwinds_to_capture() {
	let recorder = recorder_session();
	let refuse = recorder.bridge.register_client_func(|bridge| {
		let _: i64 = bridge.pop();
		Err(Exception::new("refused"))
	});

	recorder.bridge.push(1_i64);
	recorder.bridge.push(refuse);
	let exception = recorder.bridge.invoke_with_exception_capture(recorder.call_back).unwrap_err();
	assert_eq!(exception.message, "refused");
	assert_eq!(recorder.bridge.channel_depth(), 0);
	assert_eq!(recorder.module.entries(), vec!["call_back enter depth=1"]);
}

#[test]
fn test_optional_callback() {
	let recorder = recorder_session();
	recorder.bridge.push(Value::Null);
	recorder.bridge.invoke(recorder.call_optional);
	assert!(!recorder.bridge.pop::<bool>());

	let calls = Arc::new(AtomicUsize::new(0));
	let counted = calls.clone();
	let callback = recorder.bridge.register_client_func(move |_| {
		counted.fetch_add(1, Ordering::SeqCst);
		Ok(())
	});
	recorder.bridge.push(callback);
	recorder.bridge.invoke(recorder.call_optional);
	assert!(recorder.bridge.pop::<bool>());
	assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
#[should_panic(expected = "is not live")]
fn test_dangling_callback_is_violation() {
	let recorder = recorder_session();
	let callback = recorder.bridge.register_client_func(|_| Ok(()));
	recorder.bridge.release(callback.0);
	recorder.bridge.invoke_callback(callback.0).ok();
}

#[test]
fn test_shutdown_runs_module_hooks() {
	let recorder = recorder_session();
	let dump = recorder.bridge.shutdown().unwrap();
	assert!(dump.is_empty());
	assert_eq!(recorder.module.entries(), vec!["shutdown"]);
}
