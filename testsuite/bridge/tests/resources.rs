// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	collections::HashSet,
	sync::{Arc, Mutex},
};

use tether::{core::ReleaseOutcome, prelude::*};
use tether_testing::{client::Widget, toolkit};

#[test]
fn test_live_handles_are_unique() {
	let toolkit = toolkit();
	let widgets: Vec<Widget> =
		(0..64).map(|i| Widget::create(toolkit.bridge(), toolkit.tokens(), Some(&format!("w{}", i))).unwrap()).collect();

	let references: HashSet<ForeignRef> = widgets.iter().map(|widget| widget.reference()).collect();
	assert_eq!(references.len(), widgets.len());
	assert_eq!(toolkit.bridge().dump_tables().server.len(), 64);
}

#[test]
fn test_dropped_wrappers_leave_no_resources() {
	let toolkit = toolkit();
	for i in 0..16 {
		let widget = Widget::create(toolkit.bridge(), toolkit.tokens(), None).unwrap();
		widget.set_title(&format!("title {}", i)).unwrap();
		widget.on_title_changed(|_| Ok(())).unwrap();
		widget.set_title("again").unwrap();
	}

	let dump = toolkit.shutdown().unwrap();
	assert!(dump.is_empty(), "leaked: {:?}", dump);
}

#[test]
fn test_leaks_are_reported_at_shutdown() {
	let toolkit = toolkit();
	let widget = Widget::create(toolkit.bridge(), toolkit.tokens(), None).unwrap();

	let dump = toolkit.shutdown().unwrap();
	assert_eq!(dump.server.len(), 1);
	assert_eq!(dump.server[0].label, "Widget");

	// the bridge is gone; dropping the wrapper is harmless
	drop(widget);
}

#[test]
fn test_dispose_is_idempotent() {
	let toolkit = toolkit();
	let widget = Widget::create(toolkit.bridge(), toolkit.tokens(), None).unwrap();
	let reference = widget.reference();

	widget.dispose().unwrap();
	widget.dispose().unwrap();
	assert!(widget.is_disposed());
	assert!(!toolkit.bridge().is_live(reference));
	assert!(widget.title().is_err());
}

#[test]
fn test_double_release_is_reported() {
	let toolkit = toolkit();
	let widget = Widget::create(toolkit.bridge(), toolkit.tokens(), None).unwrap();
	let reference = widget.reference();
	widget.dispose().unwrap();

	assert_eq!(toolkit.bridge().release(reference), ReleaseOutcome::AlreadyReleased);
}

#[test]
fn test_release_during_callback_waits_for_permission() {
	let toolkit = toolkit();
	let emitter = Widget::create(toolkit.bridge(), toolkit.tokens(), None).unwrap();
	let victim = Widget::create(toolkit.bridge(), toolkit.tokens(), Some("victim")).unwrap();
	let victim_reference = victim.reference();

	let slot_victim = Arc::new(Mutex::new(Some(victim)));
	let held = slot_victim.clone();
	emitter
		.on_title_changed(move |_| {
			held.lock().unwrap().take();
			Ok(())
		})
		.unwrap();

	emitter.set_title("drop it").unwrap();
	assert!(slot_victim.lock().unwrap().is_none());
	assert_eq!(toolkit.bridge().deferred_count(), 1);
	assert!(toolkit.bridge().is_live(victim_reference));

	emitter.show().unwrap();
	assert_eq!(toolkit.bridge().deferred_count(), 0);
	assert!(!toolkit.bridge().is_live(victim_reference));
}

#[test]
fn test_deferred_releases_drain_at_shutdown() {
	let toolkit = toolkit();
	let emitter = Widget::create(toolkit.bridge(), toolkit.tokens(), None).unwrap();
	let victim = Widget::create(toolkit.bridge(), toolkit.tokens(), None).unwrap();

	let held = Arc::new(Mutex::new(Some(victim)));
	emitter
		.on_title_changed(move |_| {
			held.lock().unwrap().take();
			Ok(())
		})
		.unwrap();
	emitter.set_title("drop it").unwrap();
	assert_eq!(toolkit.bridge().deferred_count(), 1);
	drop(emitter);

	let dump = toolkit.shutdown().unwrap();
	assert!(dump.is_empty(), "leaked: {:?}", dump);
}
