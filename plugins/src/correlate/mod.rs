mod proximity;

pub use proximity::ProximityCorrelator;
