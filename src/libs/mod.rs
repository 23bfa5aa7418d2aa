pub mod supertree;
