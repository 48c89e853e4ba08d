mod connectivity;
mod mode;
mod reconciler;

pub use connectivity::ConnectivityMonitor;
pub use mode::ModeController;
pub use reconciler::{ReconcileSummary, SyncReconciler};
