//! Scenario tests of full runs against scripted ports.

mod routing;
