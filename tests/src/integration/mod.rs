mod store_flows;
mod sync_flows;
