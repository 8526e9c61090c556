mod fixture;

pub use fixture::FixtureEvidenceSource;
