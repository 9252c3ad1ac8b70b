pub use crate::{EARTH_RADIUS_KM, MAX_SNAP_DISTANCE_KM, RiskWeight};

// Network construction
pub use crate::loading::{
    DatasetRow, LaneRecord, NetworkConfig, build_graph, create_bike_network,
};
pub use crate::model::{BikeNetwork, LaneEdge, LaneGeometry, LaneNode, Segment};

// Route planning
pub use crate::routing::{
    Endpoint, OutOfRange, PathSearch, RouteOutcome, RoutePath, RoutePlan, RouteQuery,
    SnapResult, plan, plan_route, snap,
};

// Rendering
pub use crate::styling::{
    Marker, RiskBucket, SegmentKind, StyleMode, StyledRoute, StyledSegment, Viewport, style,
};

pub use crate::Error;
