pub mod adjacency;
pub mod centrality;
pub mod clustering;
pub mod community;
pub mod component_sizes_csv;
pub mod components;
pub mod config;
pub mod correlation;
pub mod csv_items;
pub mod dataset;
pub mod degree_dist_csv;
pub mod distances;
pub mod game_type;
pub mod metrics;
pub mod output_data;
pub mod progress_bar;
pub mod report;
pub mod stats;
pub mod summary;
pub mod traversal;
pub mod twitch_types;

pub use adjacency::Adjacency;
pub use twitch_types::{BroadcasterType, Country, NodeAttributes};
