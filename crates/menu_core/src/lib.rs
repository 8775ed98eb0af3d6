//! Menu overlay runtime: a reactive store, per-panel transition state
//! machines, the host/menu message protocol and the host-side controller.

pub mod appearance;
pub mod bridge;
pub mod capabilities;
pub mod config;
pub mod host;
pub mod scheduler;
pub mod session;
pub mod store;
pub mod surface;
pub mod theme;
pub mod view;

pub use bridge::{entangled, MessagePort};
pub use config::MenuSettings;
pub use host::{EventOutcome, HostCapabilities, HostController, HostEvent};
pub use scheduler::{ManualScheduler, Scheduler, TokioScheduler};
pub use session::{MenuSession, SessionSnapshot};
pub use store::{Store, SubscriptionHandle};
pub use surface::MenuSurface;
pub use theme::ThemeSwatch;
pub use view::{PanelDisplay, PanelStyle, View, ViewPhase};
