pub mod ledger;
pub mod mirror;
pub mod run;
