pub mod customer;
pub mod delivery_route;
pub mod delivery_route_order;
pub mod employee;
pub mod order;
pub mod order_line_item;
pub mod outbox_event;
pub mod product;
pub mod raw_material;
pub mod recipe;
pub mod replenishment_request;
pub mod required_material;
pub mod status;
pub mod truck;
