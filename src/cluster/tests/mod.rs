//! In-tree test suite for cluster labeling.

mod label_property_tests;
