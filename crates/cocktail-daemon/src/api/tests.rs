use super::responses::*;

#[test]
fn test_order_id_response_serialization() {
    let response = OrderIdResponse { order_id: cocktail_types::OrderId::new() };
    let json = serde_json::to_string(&response).unwrap();
    assert!(json.contains("order_id"));
}

#[test]
fn test_system_status_response_serialization() {
    let response = SystemStatusResponse { queued_orders: 2, total_orders: 5, total_recipes: 3, uptime_secs: 120 };
    let json = serde_json::to_string(&response).unwrap();
    assert!(json.contains("\"queued_orders\":2"));
}
