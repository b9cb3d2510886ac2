#[macro_use]
extern crate approx;

mod containment;
mod coverage;
mod meshes;
mod nearest_point;
mod plane_culling;
mod ray_queries;
