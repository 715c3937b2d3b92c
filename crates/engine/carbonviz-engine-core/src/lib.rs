//! carbonviz engine core (renderer-agnostic)
//!
//! The pieces every chart shares:
//! - [`scale`]: domain → range mappings built through [`ScaleFactory`]
//! - [`reconcile`]: pure keyed enter/update/exit diffing of visual states
//! - [`transition`]: timed, cancellable attribute interpolation per key
//! - [`stage`]: the rendered element store a backend draws from
//!
//! Charts run a diff-then-apply pipeline: compute a [`Reconciliation`] without side
//! effects, then hand it to the [`TransitionScheduler`] and the [`Stage`].

pub mod attrs;
pub mod color;
pub mod config;
pub mod error;
pub mod ids;
pub mod interp;
pub mod outputs;
pub mod reconcile;
pub mod scale;
pub mod stage;
pub mod transition;

pub use attrs::{Attrs, Collapse, Presence, Rgba};
pub use color::{Palette, SequentialScheme};
pub use config::Config;
pub use error::EngineError;
pub use ids::{ChartId, IdAllocator, TransitionId};
pub use outputs::{Change, Outputs, TransitionEvent};
pub use reconcile::{diff, reconcile, AttrChange, ChangeKind, DiffResult, KeySet, KeyedAttrs, KeyedReconciler, Reconciliation};
pub use scale::{
    BandScale, DomainData, LinearScale, OrdinalScale, RangeSpec, Scale, ScaleFactory, ScaleInput,
    ScaleKind, ScaleOptions, ScaleOutput, SequentialScale,
};
pub use stage::{Element, Stage};
pub use transition::{Timing, TransitionHandle, TransitionScheduler, TransitionStatus};
