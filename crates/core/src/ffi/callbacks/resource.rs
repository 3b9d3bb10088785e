// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Resource table callbacks

use core::ffi::c_void;

use tether_abi::{
	callbacks::resource::ResourceCallbacks, constants::*, context::ContextFFI, data::BufferRefFFI,
	library::DestroyFFI,
};
use tether_type::{ForeignRef, RefId, Side};
use tracing::{info, warn};

use super::{channel::buffer_ffi, out_ptr, read_str, side_of};
use crate::{
	ffi::{guarded, object::ForeignObject},
	table::ReleaseOutcome,
};

pub(super) fn callbacks() -> ResourceCallbacks {
	ResourceCallbacks {
		allocate_object: host_allocate_object,
		object_ptr: host_object_ptr,
		release: host_release,
		is_live: host_is_live,
		create_buffer: host_create_buffer,
		dump_tables: host_dump_tables,
	}
}

extern "C" fn host_allocate_object(
	ctx: *const ContextFFI,
	object: *mut c_void,
	destroy: Option<DestroyFFI>,
	label: *const u8,
	label_len: usize,
	id_out: *mut u32,
) -> i32 {
	guarded(ctx, |bridge| {
		let id_out = out_ptr(id_out, "id_out")?;
		// SAFETY: the library passes `label_len` readable bytes
		let label = unsafe { read_str(label, label_len) }?;
		let reference = bridge.allocate_server_object(label, ForeignObject::new(object, destroy));
		// SAFETY: checked for null
		unsafe { id_out.write(reference.id.0) };
		Ok(TETHER_OK)
	})
}

extern "C" fn host_object_ptr(ctx: *const ContextFFI, id: u32, object_out: *mut *mut c_void) -> i32 {
	guarded(ctx, |bridge| {
		let object_out = out_ptr(object_out, "object_out")?;
		let object = bridge.try_server_object::<ForeignObject>(ForeignRef::server(id))?;
		// SAFETY: checked for null
		unsafe { object_out.write(object.ptr) };
		Ok(TETHER_OK)
	})
}

/// Server resources are released at once; client resources are handed to
/// the client's release entry point.
extern "C" fn host_release(ctx: *const ContextFFI, id: u32, side: u8) -> i32 {
	guarded(ctx, |bridge| {
		let reference = ForeignRef::new(RefId(id), side_of(side)?);
		match reference.side {
			Side::Server => match bridge.release(reference) {
				ReleaseOutcome::Released => Ok(TETHER_OK),
				ReleaseOutcome::AlreadyReleased => Ok(TETHER_ALREADY_RELEASED),
			},
			Side::Client => {
				if !bridge.is_live(reference) {
					warn!(%reference, "native library released a client resource that is not live");
					return Ok(TETHER_ALREADY_RELEASED);
				}
				bridge.release_client_resource(reference);
				Ok(TETHER_OK)
			}
		}
	})
}

extern "C" fn host_is_live(ctx: *const ContextFFI, id: u32, side: u8, live_out: *mut u8) -> i32 {
	guarded(ctx, |bridge| {
		let live_out = out_ptr(live_out, "live_out")?;
		let live = bridge.is_live(ForeignRef::new(RefId(id), side_of(side)?));
		// SAFETY: checked for null
		unsafe { live_out.write(live as u8) };
		Ok(TETHER_OK)
	})
}

extern "C" fn host_create_buffer(
	ctx: *const ContextFFI,
	side: u8,
	element_size: u32,
	count: usize,
	buffer_out: *mut BufferRefFFI,
) -> i32 {
	guarded(ctx, |bridge| {
		let buffer_out = out_ptr(buffer_out, "buffer_out")?;
		let buffer = bridge.try_create_buffer(side_of(side)?, element_size, count)?;
		// SAFETY: checked for null
		unsafe { buffer_out.write(buffer_ffi(buffer)) };
		Ok(TETHER_OK)
	})
}

extern "C" fn host_dump_tables(ctx: *const ContextFFI, client_out: *mut usize, server_out: *mut usize) -> i32 {
	guarded(ctx, |bridge| {
		let client_out = out_ptr(client_out, "client_out")?;
		let server_out = out_ptr(server_out, "server_out")?;
		let dump = bridge.dump_tables();
		match dump.to_json() {
			Ok(json) => info!(tables = %json, "table dump requested by native library"),
			Err(err) => warn!(%err, "failed to serialize table dump"),
		}
		// SAFETY: both checked for null
		unsafe {
			client_out.write(dump.client.len());
			server_out.write(dump.server.len());
		}
		Ok(TETHER_OK)
	})
}
