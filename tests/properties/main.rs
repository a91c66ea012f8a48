mod determinism_tests;
mod ranking_props;
