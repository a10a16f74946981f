//! Loading of road networks, vector layers and the area catalog.

mod areas;
mod layers;
mod network;

pub use areas::{load_area_network, select_area};
pub use layers::{
    PointOfInterest, load_amenities, load_buildings, load_layers, load_park_connectors,
    load_trees, load_water,
};
pub use network::{NetworkDocument, RawEdge, RawNode, load_network, network_from_document};
