pub mod error;
pub mod tags;

pub mod chat {
    pub mod dto;
    pub mod error_mapper;
    pub mod routes;
}

pub mod health {
    pub mod routes;
}

pub mod pages {
    pub mod routes;
    pub mod templates;
}

pub mod product_images {
    pub mod forwarder;
}
