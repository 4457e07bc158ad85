mod async_order;
mod buffering;
