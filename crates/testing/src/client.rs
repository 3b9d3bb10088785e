// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Client wrapper over the `Widget` module, the way generated bindings
//! would look.

use std::sync::Arc;

use parking_lot::RwLock;
use tether_core::{Bridge, ClientModule, ClientObject};
use tether_sdk::{ChannelStruct, Class, EmitsSignal, Handle, HasHandle, TokenSet, pop_variant};
use tether_type::{Exception, InterfaceMethodToken, InterfaceToken, MethodToken, Result, Value};
use tracing::debug;

use crate::{
	model::{Item, Rect, WidgetEvent},
	widget::WidgetModule,
};

pub struct WidgetTokens {
	pub create: MethodToken,
	pub dispose: MethodToken,
	pub title: MethodToken,
	pub set_title: MethodToken,
	pub on_title_changed: MethodToken,
	pub show: MethodToken,
	pub set_width: MethodToken,
	pub get_rect: MethodToken,
	pub set_items: MethodToken,
	pub items: MethodToken,
	pub last_event: MethodToken,
	pub set_model: MethodToken,
	pub model_labels: MethodToken,
	pub item_model: InterfaceToken,
	pub count_rows: InterfaceMethodToken,
	pub row_label: InterfaceMethodToken,
}

impl TokenSet for WidgetTokens {
	fn resolve(bridge: &Bridge) -> Result<Self> {
		let module = bridge.try_resolve_module(Widget::NAME)?;
		let method = |name: &str| bridge.try_resolve_method(module, name);
		let item_model = bridge.resolve_interface(module, "ItemModel");
		Ok(Self {
			create: method("create")?,
			dispose: method("dispose")?,
			title: method("title")?,
			set_title: method("set_title")?,
			on_title_changed: method("on_title_changed")?,
			show: method("show")?,
			set_width: method("set_width")?,
			get_rect: method("get_rect")?,
			set_items: method("set_items")?,
			items: method("items")?,
			last_event: method("last_event")?,
			set_model: method("set_model")?,
			model_labels: method("model_labels")?,
			item_model,
			count_rows: bridge.resolve_interface_method(item_model, "count_rows"),
			row_label: bridge.resolve_interface_method(item_model, "row_label"),
		})
	}

	fn dispose(&self) -> MethodToken {
		self.dispose
	}
}

pub struct Widget {
	handle: Handle<Widget>,
}

impl Class for Widget {
	const NAME: &'static str = WidgetModule::NAME;
	type Tokens = WidgetTokens;
}

impl HasHandle for Widget {
	type Class = Widget;

	fn handle(&self) -> &Handle<Widget> {
		&self.handle
	}
}

impl EmitsSignal<(String,)> for Widget {}

impl Widget {
	/// Create a widget; `None` takes the native default title.
	pub fn create(bridge: &Bridge, tokens: Arc<WidgetTokens>, title: Option<&str>) -> std::result::Result<Self, Exception> {
		bridge.push(title.map(str::to_string));
		let create = tokens.create;
		Ok(Self {
			handle: Handle::create(bridge, tokens, create)?,
		})
	}

	pub fn title(&self) -> std::result::Result<String, Exception> {
		self.handle.call(self.tokens().title)?;
		Ok(self.handle.bridge()?.pop())
	}

	pub fn set_title(&self, title: &str) -> std::result::Result<(), Exception> {
		self.handle.bridge()?.push(title);
		self.handle.call(self.tokens().set_title)
	}

	pub fn on_title_changed<F>(&self, slot: F) -> std::result::Result<(), Exception>
	where
		F: Fn((String,)) -> std::result::Result<(), Exception> + Send + Sync + 'static,
	{
		self.connect(self.tokens().on_title_changed, slot)
	}

	pub fn show(&self) -> std::result::Result<(), Exception> {
		self.handle.call(self.tokens().show)
	}

	pub fn set_width(&self, width: i32) -> std::result::Result<(), Exception> {
		self.handle.bridge()?.push(width);
		self.handle.call(self.tokens().set_width)
	}

	pub fn rect(&self) -> std::result::Result<Rect, Exception> {
		self.handle.call(self.tokens().get_rect)?;
		Ok(Rect::pop_from(&self.handle.bridge()?))
	}

	pub fn set_items(&self, items: Vec<Item>) -> std::result::Result<(), Exception> {
		Item::push_columns(items, &self.handle.bridge()?);
		self.handle.call(self.tokens().set_items)
	}

	pub fn items(&self) -> std::result::Result<Vec<Item>, Exception> {
		self.handle.call(self.tokens().items)?;
		Ok(Item::pop_columns(&self.handle.bridge()?))
	}

	pub fn last_event(&self) -> std::result::Result<WidgetEvent, Exception> {
		self.handle.call(self.tokens().last_event)?;
		Ok(pop_variant(&self.handle.bridge()?))
	}

	/// Hand a client model to the widget; `None` detaches the current one.
	pub fn set_model(&self, model: Option<ListModel>) -> std::result::Result<(), Exception> {
		let bridge = self.handle.bridge()?;
		match model {
			Some(model) => {
				let reference = bridge.register_client_object(self.tokens().item_model, Arc::new(model));
				bridge.push(reference);
			}
			None => bridge.push(Value::Null),
		}
		self.handle.call(self.tokens().set_model)
	}

	pub fn model_labels(&self) -> std::result::Result<Vec<String>, Exception> {
		self.handle.call(self.tokens().model_labels)?;
		Ok(self.handle.bridge()?.pop())
	}
}

/// A client-side `ItemModel` over a fixed list of labels.
pub struct ListModel {
	rows: Vec<String>,
	count_rows: InterfaceMethodToken,
	row_label: InterfaceMethodToken,
}

impl ListModel {
	pub fn new(tokens: &WidgetTokens, rows: impl IntoIterator<Item = impl Into<String>>) -> Self {
		Self {
			rows: rows.into_iter().map(Into::into).collect(),
			count_rows: tokens.count_rows,
			row_label: tokens.row_label,
		}
	}
}

impl ClientObject for ListModel {
	fn invoke(&self, bridge: &Bridge, method: InterfaceMethodToken) -> std::result::Result<(), Exception> {
		if method == self.count_rows {
			bridge.push(self.rows.len() as i32);
		} else if method == self.row_label {
			let row: i32 = bridge.pop();
			let label = usize::try_from(row)
				.ok()
				.and_then(|row| self.rows.get(row))
				.ok_or_else(|| Exception::new(format!("row {} out of range", row)))?;
			bridge.push(label.as_str());
		} else {
			return Err(Exception::new(format!("ItemModel has no method {}", method)));
		}
		Ok(())
	}
}

/// Resolves the widget tokens when the runtime starts.
#[derive(Clone, Default)]
pub struct WidgetClient {
	tokens: Arc<RwLock<Option<Arc<WidgetTokens>>>>,
}

impl WidgetClient {
	pub fn new() -> Self {
		Self::default()
	}

	/// `None` before initialization and after shutdown.
	pub fn tokens(&self) -> Option<Arc<WidgetTokens>> {
		self.tokens.read().clone()
	}
}

impl ClientModule for WidgetClient {
	fn name(&self) -> &str {
		"widget-client"
	}

	fn init(&self, bridge: &Bridge) -> Result<()> {
		let tokens = WidgetTokens::resolve(bridge)?;
		*self.tokens.write() = Some(Arc::new(tokens));
		debug!("widget tokens resolved");
		Ok(())
	}

	fn shutdown(&self, _bridge: &Bridge) {
		self.tokens.write().take();
	}
}
