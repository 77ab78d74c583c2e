pub mod application {
    pub mod catalog {
        pub mod product_image_function;
    }
    pub mod chat {
        pub mod send_message;
    }
}

pub mod domain {
    pub mod errors;
    pub mod logger;
    pub mod catalog {
        pub mod product_image;
    }
    pub mod chat {
        pub mod errors;
        pub mod function_invocation;
        pub mod model;
        pub mod services;
        pub mod settings;
        pub mod shared_client;
        pub mod use_cases {
            pub mod send_message;
        }
    }
    pub mod forwarding {
        pub mod errors;
        pub mod route_template;
        pub mod rule;
    }
}
