mod helpers;
mod test_api;
mod test_engine_flows;
