//! agile-map lays out agile work item hierarchies as node maps inside a 3D/VR graph host.
//!
//! Work items come from a data provider ([`client`]), are placed bottom-up by a
//! [`session::LayoutSession`] using the [`layout`] algorithm, and are drawn through a
//! [`host::RenderHost`]. The [`api`] module serves a fixture provider for local use.

pub mod api;
pub mod attributes;
pub mod catalog;
pub mod client;
pub mod config;
pub mod db;
pub mod forest;
pub mod host;
pub mod identity;
pub mod layout;
pub mod models;
pub mod session;
pub mod status;
pub mod tree_render;
pub mod workbench;
