mod test_analysis;
mod test_impact;
mod test_store;
