// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! `Widget`: a mock native toolkit class
//!
//! Every instance method pops the instance first, then its arguments.

use std::sync::Arc;

use parking_lot::Mutex;
use tether_core::{Bridge, ModuleBuilder, NativeModule, Remote};
use tether_sdk::{ChannelStruct, push_variant};
use tether_type::{Exception, ExceptionToken, ForeignRef, InterfaceMethodToken, Result};
use tracing::debug;

use crate::model::{Item, Rect, WidgetEvent};

pub const WIDGET_SIZE_MAX: i32 = 4096;

#[derive(Default)]
struct WidgetState {
	title: String,
	rect: Rect,
	items: Vec<Item>,
	title_changed: Vec<Arc<Remote>>,
	model: Option<Arc<Remote>>,
	last_event: WidgetEvent,
}

type Widget = Mutex<WidgetState>;

fn this(bridge: &Bridge) -> (ForeignRef, Arc<Widget>) {
	let reference: ForeignRef = bridge.pop();
	(reference, bridge.server_object::<Widget>(reference))
}

pub struct WidgetModule;

impl WidgetModule {
	pub const NAME: &'static str = "Widget";
}

impl NativeModule for WidgetModule {
	fn name(&self) -> &str {
		Self::NAME
	}

	fn register(&self, module: &mut ModuleBuilder<'_>) -> Result<()> {
		module.constant("WIDGET_SIZE_MAX", WIDGET_SIZE_MAX)?;
		module.constant("DEFAULT_TITLE", "untitled")?;
		let invalid_argument = module.exception("InvalidArgument")?;
		let item_model = module.interface("ItemModel", &["count_rows", "row_label"])?;
		let count_rows = module.interface_method(item_model, "count_rows")?;
		let row_label = module.interface_method(item_model, "row_label")?;

		// create(title: string | null) -> Widget
		module.method("create", |bridge| {
			let title = bridge.pop::<Option<String>>().unwrap_or_else(|| "untitled".to_string());
			let state = WidgetState {
				title,
				rect: Rect {
					x: 0,
					y: 0,
					width: 100,
					height: 30,
				},
				..WidgetState::default()
			};
			let reference = bridge.allocate_server_object("Widget", Mutex::new(state));
			bridge.push(reference);
			Ok(())
		})?;

		module.method("dispose", |bridge| {
			let reference: ForeignRef = bridge.pop();
			debug!(%reference, "dispose widget");
			bridge.release(reference);
			Ok(())
		})?;

		module.method("title", |bridge| {
			let (_, widget) = this(bridge);
			let title = widget.lock().title.clone();
			bridge.push(title);
			Ok(())
		})?;

		// set_title(title: string); notifies every title_changed slot
		module.method("set_title", |bridge| {
			let (_, widget) = this(bridge);
			let title: String = bridge.pop();
			let slots = {
				let mut state = widget.lock();
				let from = std::mem::replace(&mut state.title, title.clone());
				state.last_event = WidgetEvent::Renamed {
					from,
					to: title.clone(),
				};
				state.title_changed.clone()
			};
			for slot in slots {
				slot.call((title.clone(),))?;
			}
			Ok(())
		})?;

		// on_title_changed(slot: fn(string))
		module.method("on_title_changed", |bridge| {
			let (_, widget) = this(bridge);
			let slot = bridge.pop_remote();
			widget.lock().title_changed.push(Arc::new(slot));
			Ok(())
		})?;

		// show(); grants the client permission to release deferred widgets
		module.method("show", |bridge| {
			let (_, widget) = this(bridge);
			widget.lock().last_event = WidgetEvent::Shown;
			bridge.clear_safety_area();
			Ok(())
		})?;

		// set_width(width: i32); raises InvalidArgument outside 0..=WIDGET_SIZE_MAX
		module.method("set_width", move |bridge| {
			let (_, widget) = this(bridge);
			let width: i32 = bridge.pop();
			if !(0..=WIDGET_SIZE_MAX).contains(&width) {
				return Err(invalid_width(invalid_argument, width));
			}
			let mut state = widget.lock();
			state.rect.width = width;
			state.last_event = WidgetEvent::Resized(width);
			Ok(())
		})?;

		// get_rect() -> Rect
		module.method("get_rect", |bridge| {
			let (_, widget) = this(bridge);
			let rect = widget.lock().rect;
			rect.push_to(bridge);
			Ok(())
		})?;

		// set_items(items: [Item]), columnar
		module.method("set_items", |bridge| {
			let (_, widget) = this(bridge);
			let items = Item::pop_columns(bridge);
			widget.lock().items = items;
			Ok(())
		})?;

		// items() -> [Item], columnar
		module.method("items", |bridge| {
			let (_, widget) = this(bridge);
			let items = widget.lock().items.clone();
			Item::push_columns(items, bridge);
			Ok(())
		})?;

		module.method("last_event", |bridge| {
			let (_, widget) = this(bridge);
			let event = widget.lock().last_event.clone();
			push_variant(bridge, event);
			Ok(())
		})?;

		// set_model(model: ItemModel | null)
		module.method("set_model", |bridge| {
			let (_, widget) = this(bridge);
			let model = bridge.pop_optional_remote().map(Arc::new);
			let previous = std::mem::replace(&mut widget.lock().model, model);
			drop(previous);
			Ok(())
		})?;

		// model_labels() -> [string], asks the client model row by row
		module.method("model_labels", move |bridge| {
			let (_, widget) = this(bridge);
			let model = widget.lock().model.clone();
			let Some(model) = model else {
				bridge.push(Vec::<String>::new());
				return Ok(());
			};
			bridge.push(model_labels(bridge, &model, count_rows, row_label)?);
			Ok(())
		})?;

		Ok(())
	}
}

fn invalid_width(kind: ExceptionToken, width: i32) -> Exception {
	Exception::of_kind(kind, format!("width {} is outside 0..={}", width, WIDGET_SIZE_MAX)).with_field(width)
}

fn model_labels(
	bridge: &Bridge,
	model: &Remote,
	count_rows: InterfaceMethodToken,
	row_label: InterfaceMethodToken,
) -> std::result::Result<Vec<String>, Exception> {
	model.invoke_method(count_rows)?;
	let rows: i32 = bridge.pop();
	let mut labels = Vec::with_capacity(rows.max(0) as usize);
	for row in 0..rows {
		bridge.push(row);
		model.invoke_method(row_label)?;
		labels.push(bridge.pop::<String>());
	}
	Ok(labels)
}
