fn main() {
    // Only run gRPC codegen when the "grpc" feature is enabled.
    // Cargo sets CARGO_FEATURE_GRPC when compiling with --features grpc.
    if std::env::var("CARGO_FEATURE_GRPC").is_ok() {
        let service = tonic_build::manual::Service::builder()
            .name("StatisticsService")
            .package("statistics")
            .method(
                tonic_build::manual::Method::builder()
                    .name("get_user_order_statistics")
                    .route_name("GetUserOrderStatistics")
                    .input_type("crate::service::grpc::UserOrderStatisticsRequest")
                    .output_type("crate::service::grpc::UserOrderStatisticsResponse")
                    .codec_path("tonic::codec::ProstCodec")
                    .build(),
            )
            .method(
                tonic_build::manual::Method::builder()
                    .name("get_user_statistics")
                    .route_name("GetUserStatistics")
                    .input_type("crate::service::grpc::UserStatisticsRequest")
                    .output_type("crate::service::grpc::UserStatisticsResponse")
                    .codec_path("tonic::codec::ProstCodec")
                    .build(),
            )
            .method(
                tonic_build::manual::Method::builder()
                    .name("health")
                    .route_name("Health")
                    .input_type("crate::service::grpc::HealthRequest")
                    .output_type("crate::service::grpc::HealthResponse")
                    .codec_path("tonic::codec::ProstCodec")
                    .build(),
            )
            .build();

        tonic_build::manual::Builder::new().compile(&[service]);
    }
}
