pub mod angles;
pub mod geometry;
pub mod interaction;
pub mod layout;
pub mod macros;
pub mod model;
pub mod ordering;
pub mod scene;
pub mod style;
pub mod theme;

pub use geometry::Point;
pub use interaction::{HitTarget, InteractionState, OrbitEvent, SelectionHandler, Tooltip};
pub use layout::{LayoutOptions, PlanCache, RenderPlan, ResolvedGroup, plan};
pub use model::{Center, Dataset, Group, GroupId, Item, ItemId, ItemKey};
pub use ordering::{ItemComparator, SortMode};
pub use scene::{Scene, SvgSurface, Surface, compose, paint};
pub use style::StyleOptions;
pub use theme::{Color, ThemeColors};
