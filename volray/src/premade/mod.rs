// Some prebuilt transfer functions
// for datasets used in development.
// Every dataset needs its own, these are starting points.

pub mod transfer_functions;
