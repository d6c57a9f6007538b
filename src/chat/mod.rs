pub mod render;
pub mod view;

pub use view::{ ChatDeps, ChatView, Route, ViewState };
