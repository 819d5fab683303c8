use crate::modules::image_analysis::handle::*;
use actix_web::web::{scope, ServiceConfig};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(analyze).service(upload_image).service(
        scope("/rpc")
            .service(analyze_image)
            .service(get_images)
            .service(get_image_by_id)
            .service(update_image)
            .service(delete_image)
            .service(health_check),
    );
}
