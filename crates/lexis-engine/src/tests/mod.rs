mod doubles;
mod orchestrator_tests;
