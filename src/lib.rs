pub mod clipboard;
pub mod config;
pub mod error;
pub mod injector;
pub mod messages;
pub mod page;
pub mod popup;
pub mod port;
pub mod tabs;

pub use config::Config;
pub use error::YapYapError;
pub use injector::PageInjector;
pub use messages::{PageCommand, RecognizerCommand, StatusUpdate};
pub use page::Page;
pub use popup::PopupController;
pub use port::{RecognizerPort, SocketPort};
pub use tabs::{LocalTabs, TabHost};
