// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{any::Any, sync::Arc};

use parking_lot::Mutex;
use tether_type::{BufferDescriptor, BufferRef, Error, ForeignRef, MethodToken, NativePtr, Result, Side, Value};
use tracing::{debug, trace, warn};

use super::{Bridge, ClientEntry, ServerEntry};
use crate::{
	dump::TableDump,
	lifecycle::LifecycleState,
	safety::DeferredRelease,
	table::{ReleaseOutcome, ResourceKind},
};

impl Bridge {
	/// Store a native object in the server table.
	pub fn allocate_server_object<T: Any + Send + Sync>(&self, label: &str, object: T) -> ForeignRef {
		self.allocate_server_arc(label, Arc::new(object))
	}

	pub fn allocate_server_arc(&self, label: &str, object: Arc<dyn Any + Send + Sync>) -> ForeignRef {
		let reference =
			self.core().server.borrow_mut().allocate(ResourceKind::Object, label, ServerEntry::Object(object));
		debug!(%reference, label, "allocated server object");
		reference
	}

	/// Look up a live server object of type `T`.
	pub fn server_object<T: Any + Send + Sync>(&self, reference: ForeignRef) -> Arc<T> {
		let result = self.try_server_object(reference);
		self.check(result)
	}

	pub fn try_server_object<T: Any + Send + Sync>(&self, reference: ForeignRef) -> Result<Arc<T>> {
		if reference.side != Side::Server {
			return Err(Error::ResourceKindMismatch {
				reference,
				expected: "server object",
				found: "client resource",
			});
		}

		let object = {
			let core = self.core();
			let server = core.server.borrow();
			match server.get(reference.id) {
				Some((_, ServerEntry::Object(object))) => object.clone(),
				Some((kind, _)) => {
					return Err(Error::ResourceKindMismatch {
						reference,
						expected: ResourceKind::Object.as_str(),
						found: kind.as_str(),
					});
				}
				None => {
					return Err(Error::DeadReference {
						reference,
					});
				}
			}
		};

		object.downcast::<T>().map_err(|_| Error::ResourceKindMismatch {
			reference,
			expected: std::any::type_name::<T>(),
			found: "object of another type",
		})
	}

	/// Release a resource on either side immediately.
	///
	/// Releasing a resource that is not live is reported, never fatal.
	pub fn release(&self, reference: ForeignRef) -> ReleaseOutcome {
		let core = self.core();
		let released = match reference.side {
			Side::Server => core.server.borrow_mut().release(reference.id).map(Released::Server),
			Side::Client => core.client.borrow_mut().release(reference.id).map(Released::Client),
		};

		// Dropped after the table borrow ended: the entry may own further
		// resources that release themselves.
		match released {
			Some(entry) => {
				drop(entry);
				debug!(%reference, "released");
				ReleaseOutcome::Released
			}
			None => {
				warn!(%reference, "release of a resource that is not live");
				ReleaseOutcome::AlreadyReleased
			}
		}
	}

	pub fn is_live(&self, reference: ForeignRef) -> bool {
		let core = self.core();
		match reference.side {
			Side::Server => core.server.borrow().is_live(reference.id),
			Side::Client => core.client.borrow().is_live(reference.id),
		}
	}

	pub(crate) fn resource_kind(&self, reference: ForeignRef) -> Option<ResourceKind> {
		let core = self.core();
		match reference.side {
			Side::Server => core.server.borrow().kind(reference.id),
			Side::Client => core.client.borrow().kind(reference.id),
		}
	}

	/// Allocate a zeroed buffer of `count` elements in the table of `side`.
	pub fn create_buffer(&self, side: Side, element_size: u32, count: usize) -> BufferRef {
		let result = self.try_create_buffer(side, element_size, count);
		self.check(result)
	}

	pub fn try_create_buffer(&self, side: Side, element_size: u32, count: usize) -> Result<BufferRef> {
		let total_size = BufferDescriptor::total_size(element_size, count).ok_or(Error::BufferTooLarge {
			element_size,
			count,
		})?;
		let mut storage = vec![0_u8; total_size].into_boxed_slice();
		let start = NativePtr::from_ptr(storage.as_mut_ptr());
		let descriptor = BufferDescriptor::new(start, element_size, count).ok_or(Error::BufferTooLarge {
			element_size,
			count,
		})?;
		let buffer: Arc<Mutex<Box<[u8]>>> = Arc::new(Mutex::new(storage));

		let core = self.core();
		let owner = match side {
			Side::Server => {
				core.server.borrow_mut().allocate(ResourceKind::Buffer, "buffer", ServerEntry::Buffer(buffer))
			}
			Side::Client => {
				core.client.borrow_mut().allocate(ResourceKind::Buffer, "buffer", ClientEntry::Buffer(buffer))
			}
		};
		debug!(%owner, element_size, count, "allocated buffer");

		Ok(BufferRef {
			owner,
			descriptor,
		})
	}

	/// Run `f` over the bytes of a live buffer.
	pub fn with_buffer<R>(&self, buffer: BufferRef, f: impl FnOnce(&mut [u8]) -> R) -> R {
		let storage = {
			let core = self.core();
			match buffer.owner.side {
				Side::Server => match core.server.borrow().get(buffer.owner.id) {
					Some((_, ServerEntry::Buffer(storage))) => Some(storage.clone()),
					_ => None,
				},
				Side::Client => match core.client.borrow().get(buffer.owner.id) {
					Some((_, ClientEntry::Buffer(storage))) => Some(storage.clone()),
					_ => None,
				},
			}
		};

		let Some(storage) = storage else {
			self.violation(Error::DeadReference {
				reference: buffer.owner,
			})
		};
		let mut bytes = storage.lock();
		f(&mut bytes)
	}

	/// Release a resource on behalf of the client.
	///
	/// While a native call is in flight the release is deferred to the safety
	/// area; it happens once the native side grants permission. With a
	/// `dispose` method the release goes through that method, otherwise the
	/// resource is dropped from its table.
	pub fn release_from_client(&self, reference: ForeignRef, dispose: Option<MethodToken>) {
		let core = self.core();
		if core.depth.get() > 0 && self.inner.config.defer_releases_in_calls {
			trace!(%reference, "deferring release to the safety area");
			core.safety.borrow_mut().defer(DeferredRelease {
				reference,
				dispose,
			});
			return;
		}
		drop(core);
		self.perform_release(reference, dispose);
	}

	/// Grant the client permission to release what it deferred.
	pub fn clear_safety_area(&self) {
		let entry_points = self.inner.entry_points.clone();
		let _section = self.core();
		entry_points.clear_safety_area(self);
	}

	/// Release every deferred resource.
	///
	/// Unless `force` is set nothing happens while a client callback is on the
	/// stack: the permission is used when the client is not mid-callback.
	pub(crate) fn drain_safety_area(&self, force: bool) {
		let core = self.core();
		if !force && core.client_frames.get() > 0 {
			trace!(frames = core.client_frames.get(), "safety area kept, client callback in progress");
			return;
		}

		loop {
			let pending = core.safety.borrow_mut().take();
			if pending.is_empty() {
				break;
			}
			debug!(count = pending.len(), "clearing safety area");
			for deferred in pending {
				self.perform_release(deferred.reference, deferred.dispose);
			}
			if core.depth.get() > 0 {
				// Releases deferred while draining inside a call wait for the
				// next permission.
				break;
			}
		}
	}

	fn perform_release(&self, reference: ForeignRef, dispose: Option<MethodToken>) {
		match dispose {
			Some(method) if self.is_live(reference) => {
				self.push(Value::Instance(reference));
				if let Err(exception) = self.invoke_with_exception_capture(method) {
					warn!(%reference, %exception, "dispose raised");
				}
			}
			_ => {
				self.release(reference);
			}
		}
	}

	/// Deferred releases waiting for permission.
	pub fn deferred_count(&self) -> usize {
		self.core().safety.borrow().len()
	}

	/// Whether resource releases are honored right now.
	pub(crate) fn accepts_releases(&self) -> bool {
		let core = self.core();
		!core.clearing.get() && core.state.get() != LifecycleState::Shutdown
	}

	/// Live resources per side, plus the deferred releases.
	pub fn dump_tables(&self) -> TableDump {
		let core = self.core();
		TableDump {
			client: core.client.borrow().dump(),
			server: core.server.borrow().dump(),
			deferred: core.safety.borrow().references(),
		}
	}

	/// Release every resource of both tables.
	pub fn clear_tables(&self) {
		let core = self.core();
		core.clearing.set(true);
		core.safety.borrow_mut().take();
		let client = core.client.borrow_mut().drain();
		let server = core.server.borrow_mut().drain();
		debug!(client = client.len(), server = server.len(), "clearing tables");
		drop(client);
		drop(server);
		core.clearing.set(false);
	}
}

enum Released {
	Server(#[allow(dead_code)] ServerEntry),
	Client(#[allow(dead_code)] ClientEntry),
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::{AtomicBool, Ordering};

	use super::*;
	use crate::{
		NativeLibrary,
		testing::{FnModule, session, session_with},
	};

	struct Probe {
		dropped: Arc<AtomicBool>,
	}

	impl Drop for Probe {
		fn drop(&mut self) {
			self.dropped.store(true, Ordering::SeqCst);
		}
	}

	#[test]
	fn test_server_object_round_trip() {
		let bridge = session();
		let reference = bridge.allocate_server_object("Counter", Mutex::new(3_i64));
		*bridge.server_object::<Mutex<i64>>(reference).lock() += 1;
		assert_eq!(*bridge.server_object::<Mutex<i64>>(reference).lock(), 4);
	}

	#[test]
	fn test_release_drops_object_once() {
		let bridge = session();
		let dropped = Arc::new(AtomicBool::new(false));
		let reference = bridge.allocate_server_object(
			"Probe",
			Probe {
				dropped: dropped.clone(),
			},
		);

		assert_eq!(bridge.release(reference), ReleaseOutcome::Released);
		assert!(dropped.load(Ordering::SeqCst));
		assert_eq!(bridge.release(reference), ReleaseOutcome::AlreadyReleased);
		assert!(!bridge.is_live(reference));
	}

	#[test]
	fn test_same_id_on_both_sides() {
		let bridge = session();
		let server = bridge.allocate_server_object("Widget", ());
		let client = bridge.register_client_func(|_| Ok(())).0;
		assert_eq!(server.id, client.id);
		bridge.release(server);
		assert!(bridge.is_live(client));
		bridge.release(client);
	}

	#[test]
	fn test_wrong_object_type_is_reported() {
		let bridge = session();
		let reference = bridge.allocate_server_object("Counter", 1_u8);
		assert!(matches!(bridge.try_server_object::<String>(reference), Err(Error::ResourceKindMismatch { .. })));
	}

	#[test]
	#[should_panic(expected = "is not live")]
	fn test_dead_object_is_violation() {
		let bridge = session();
		let reference = bridge.allocate_server_object("Counter", 1_u8);
		bridge.release(reference);
		bridge.server_object::<u8>(reference);
	}

	#[test]
	fn test_buffer_bytes() {
		let bridge = session();
		let buffer = bridge.create_buffer(Side::Client, 4, 3);
		assert_eq!(buffer.descriptor.total_size, 12);
		assert_eq!(buffer.owner.side, Side::Client);

		bridge.with_buffer(buffer, |bytes| {
			assert!(bytes.iter().all(|b| *b == 0));
			bytes[0] = 7;
		});
		assert_eq!(bridge.with_buffer(buffer, |bytes| bytes[0]), 7);
		assert_eq!(bridge.release(buffer.owner), ReleaseOutcome::Released);
	}

	#[test]
	fn test_oversized_buffer_is_refused() {
		let bridge = session();
		let err = bridge.try_create_buffer(Side::Server, u32::MAX, usize::MAX).unwrap_err();
		assert_eq!(
			err,
			Error::BufferTooLarge {
				element_size: u32::MAX,
				count: usize::MAX
			}
		);
		assert!(bridge.try_create_buffer(Side::Server, 2, isize::MAX as usize).is_err());
		assert!(bridge.dump_tables().is_empty());
	}

	#[test]
	fn test_release_outside_call_is_immediate() {
		let bridge = session();
		let reference = bridge.allocate_server_object("Widget", ());
		bridge.release_from_client(reference, None);
		assert!(!bridge.is_live(reference));
		assert_eq!(bridge.deferred_count(), 0);
	}

	#[test]
	fn test_release_inside_call_is_deferred() {
		let bridge = session_with(NativeLibrary::new().with_module(FnModule::new("Host", |module| {
			module.method("run", |bridge| {
				let callback = bridge.pop_remote();
				callback.exec()?;
				bridge.push(bridge.deferred_count() as u32);
				bridge.clear_safety_area();
				bridge.push(bridge.deferred_count() as u32);
				Ok(())
			})?;
			Ok(())
		})));
		let host = bridge.resolve_module("Host");
		let run = bridge.resolve_method(host, "run");

		let widget = bridge.allocate_server_object("Widget", ());
		let callback = bridge.register_client_func(move |bridge| {
			bridge.release_from_client(widget, None);
			Ok(())
		});

		bridge.push(callback);
		bridge.invoke(run);
		// the permission arrived while the client callback had returned
		assert_eq!(bridge.pop::<u32>(), 0);
		assert_eq!(bridge.pop::<u32>(), 1);
		assert!(!bridge.is_live(widget));
	}

	#[test]
	fn test_permission_ignored_during_client_callback() {
		let bridge = session_with(NativeLibrary::new().with_module(FnModule::new("Host", |module| {
			module.method("grant", |bridge| {
				bridge.clear_safety_area();
				Ok(())
			})?;
			module.method("run", |bridge| {
				let callback = bridge.pop_remote();
				callback.exec()?;
				Ok(())
			})?;
			Ok(())
		})));
		let host = bridge.resolve_module("Host");
		let grant = bridge.resolve_method(host, "grant");
		let run = bridge.resolve_method(host, "run");

		let widget = bridge.allocate_server_object("Widget", ());
		let callback = bridge.register_client_func(move |bridge| {
			bridge.release_from_client(widget, None);
			bridge.invoke(grant);
			Ok(())
		});

		bridge.push(callback);
		bridge.invoke(run);
		assert!(bridge.is_live(widget));
		assert_eq!(bridge.dump_tables().deferred, vec![widget]);

		bridge.invoke(grant);
		assert!(!bridge.is_live(widget));
	}

	#[test]
	fn test_deferred_release_through_dispose() {
		let disposed = Arc::new(AtomicBool::new(false));
		let seen = disposed.clone();
		let bridge = session_with(NativeLibrary::new().with_module(FnModule::new("Widget", move |module| {
			let seen = seen.clone();
			module.method("dispose", move |bridge| {
				let widget = bridge.pop::<ForeignRef>();
				bridge.release(widget);
				seen.store(true, Ordering::SeqCst);
				Ok(())
			})?;
			module.method("show", |bridge| {
				let callback = bridge.pop_remote();
				callback.exec()?;
				bridge.clear_safety_area();
				Ok(())
			})?;
			Ok(())
		})));
		let module = bridge.resolve_module("Widget");
		let dispose = bridge.resolve_method(module, "dispose");
		let show = bridge.resolve_method(module, "show");

		let widget = bridge.allocate_server_object("Widget", ());
		let callback = bridge.register_client_func(move |bridge| {
			bridge.release_from_client(widget, Some(dispose));
			Ok(())
		});

		bridge.push(callback);
		bridge.invoke(show);
		assert!(disposed.load(Ordering::SeqCst));
		assert!(!bridge.is_live(widget));
		assert!(bridge.dump_tables().is_empty());
	}

	#[test]
	fn test_clear_tables() {
		let bridge = session();
		bridge.allocate_server_object("Widget", ());
		bridge.register_client_func(|_| Ok(()));
		assert!(!bridge.dump_tables().is_empty());
		bridge.clear_tables();
		assert!(bridge.dump_tables().is_empty());
	}
}
