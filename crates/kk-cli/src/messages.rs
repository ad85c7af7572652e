//! Operator message catalog (en / vi).
//!
//! An immutable lookup selected once per process from the persistent config.
//! Unknown keys fall back to English, then to the key itself.

use kk_types::Language;
use once_cell::sync::{Lazy, OnceCell};
use std::collections::HashMap;

static CURRENT: OnceCell<Language> = OnceCell::new();

/// Set once at startup; later calls are ignored.
pub fn set_language(language: Language) {
    let _ = CURRENT.set(language);
}

pub fn current_language() -> Language {
    CURRENT.get().copied().unwrap_or_default()
}

pub fn msg(key: &str) -> &'static str {
    let catalog = match current_language() {
        Language::En => &*MESSAGES_EN,
        Language::Vi => &*MESSAGES_VI,
    };
    if let Some(text) = catalog.get(key) {
        return text;
    }
    if let Some(text) = MESSAGES_EN.get(key) {
        return text;
    }
    // Leak only unknown keys; callers pass literals.
    Box::leak(key.to_string().into_boxed_str())
}

static MESSAGES_EN: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("checking_docker", "Checking Docker..."),
        ("docker_ok", "Docker is ready"),
        ("init_cancelled", "Initialization cancelled"),
        ("compose_exists", "docker-compose.yml already exists. Overwrite?"),
        ("enable_seaweedfs", "Enable SeaweedFS file storage?"),
        ("enable_caddy", "Enable Caddy reverse proxy?"),
        ("enter_domain", "Enter domain (e.g. example.com)"),
        ("edit_secrets", "Edit the generated secrets?"),
        ("generating_secrets", "Generating secrets..."),
        ("generating_files", "Generating configuration files..."),
        ("files_backed_up", "Existing files preserved as .bak:"),
        ("init_complete", "Initialization complete!"),
        ("next_steps", "Next steps:\n  1. Review and edit .env if needed\n  2. Run: kk start"),
        ("preflight_checking", "Running preflight checks..."),
        ("preflight_failed", "Preflight checks failed"),
        ("starting_services", "Starting services..."),
        ("start_failed", "Start failed"),
        ("start_complete", "Start complete!"),
        ("health_checking", "Checking service health..."),
        ("health_degraded", "Some services are not ready yet. Check: kk status"),
        ("stopping", "Stopping..."),
        ("stopping_services", "Stopping services..."),
        ("stop_failed", "Stop failed"),
        ("stop_complete", "All services stopped"),
        ("restarting", "Restarting services..."),
        ("restart_failed", "Restart failed"),
        ("restart_complete", "Restart complete!"),
        ("removing_services", "Removing containers and networks..."),
        ("remove_failed", "Remove failed"),
        ("remove_complete", "Removed containers and networks"),
        ("remove_with_volumes", "Removed containers, networks, and volumes"),
        ("confirm_remove_volumes", "Also delete volumes? All stack data will be lost"),
        ("checking_updates", "Checking for image updates..."),
        ("pulling_images", "Pulling images..."),
        ("pull_failed", "Pull failed"),
        ("all_up_to_date", "All images are up to date"),
        ("updates_available", "Updates available"),
        ("confirm_recreate", "Restart services with the new images?"),
        ("update_cancelled", "Update cancelled. Images are downloaded; run 'kk restart' to apply"),
        ("recreating", "Recreating services with new images..."),
        ("recreate_failed", "Recreate failed"),
        ("update_complete", "Update complete!"),
        ("service_status", "Service status"),
        ("no_services_defined", "No services defined in docker-compose.yml"),
        ("get_status_failed", "Cannot read service status"),
        ("project_not_configured", "Project not configured"),
        ("run_init_to_configure", "Run init to configure the project"),
        ("unhealthy_hint", "service(s) unhealthy"),
        ("view_logs_hint", "View logs: docker compose logs"),
        ("access_info", "Access"),
        ("config_title", "kk configuration"),
        ("config_language", "Language"),
        ("config_project_dir", "Project directory"),
        ("config_file_path", "Config file"),
        ("config_not_set", "(not set)"),
        ("config_saved", "Configuration saved"),
        ("to_fix", "To fix"),
        ("then_run", "Then run"),
        ("automation_installed", "Automation add-on installed"),
        ("automation_exists", "Automation add-on already installed. Overwrite?"),
        ("automation_not_installed", "Automation add-on is not installed"),
        ("automation_removed", "Automation add-on containers removed"),
        ("col_service", "SERVICE"),
        ("col_status", "STATUS"),
        ("col_health", "HEALTH"),
        ("col_ports", "PORTS"),
        ("col_image", "IMAGE"),
        ("status_running", "running"),
        ("status_stopped", "stopped"),
    ])
});

static MESSAGES_VI: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("checking_docker", "Đang kiểm tra Docker..."),
        ("docker_ok", "Docker đã sẵn sàng"),
        ("init_cancelled", "Hủy khởi tạo"),
        ("compose_exists", "docker-compose.yml đã tồn tại. Ghi đè?"),
        ("enable_seaweedfs", "Bật SeaweedFS file storage?"),
        ("enable_caddy", "Bật Caddy reverse proxy?"),
        ("enter_domain", "Nhập domain (vd: example.com)"),
        ("edit_secrets", "Sửa các secret vừa tạo?"),
        ("generating_secrets", "Đang tạo secret..."),
        ("generating_files", "Đang tạo các file cấu hình..."),
        ("files_backed_up", "File cũ được giữ lại với đuôi .bak:"),
        ("init_complete", "Khởi tạo hoàn tất!"),
        ("next_steps", "Bước tiếp theo:\n  1. Kiểm tra và chỉnh sửa .env nếu cần\n  2. Chạy: kk start"),
        ("preflight_checking", "Kiểm tra trước khi chạy..."),
        ("preflight_failed", "Kiểm tra thất bại. Vui lòng sửa lỗi trên"),
        ("starting_services", "Khởi động services..."),
        ("start_failed", "Khởi động thất bại"),
        ("start_complete", "Khởi động hoàn tất!"),
        ("health_checking", "Đang kiểm tra sức khỏe dịch vụ..."),
        ("health_degraded", "Một số dịch vụ chưa sẵn sàng. Kiểm tra: kk status"),
        ("stopping", "Đang dừng lại..."),
        ("stopping_services", "Đang dừng dịch vụ..."),
        ("stop_failed", "Dừng thất bại"),
        ("stop_complete", "Đã dừng tất cả dịch vụ"),
        ("restarting", "Đang khởi động lại dịch vụ..."),
        ("restart_failed", "Khởi động lại thất bại"),
        ("restart_complete", "Đã khởi động lại"),
        ("removing_services", "Đang gỡ containers và networks..."),
        ("remove_failed", "Gỡ thất bại"),
        ("remove_complete", "Đã gỡ containers và networks"),
        ("remove_with_volumes", "Đã gỡ containers, networks và volumes"),
        ("confirm_remove_volumes", "Xóa cả volumes? Toàn bộ dữ liệu sẽ mất"),
        ("checking_updates", "Đang kiểm tra cập nhật..."),
        ("pulling_images", "Đang tải images..."),
        ("pull_failed", "Không tải được images"),
        ("all_up_to_date", "Tất cả images đã là phiên bản mới nhất"),
        ("updates_available", "Có cập nhật"),
        ("confirm_recreate", "Khởi động lại services với images mới?"),
        ("update_cancelled", "Hủy cập nhật. Images đã được tải, chạy 'kk restart' để áp dụng"),
        ("recreating", "Đang khởi động lại với images mới..."),
        ("recreate_failed", "Recreate thất bại"),
        ("update_complete", "Cập nhật hoàn tất!"),
        ("service_status", "Trạng thái dịch vụ"),
        ("no_services_defined", "Chưa có dịch vụ nào trong docker-compose.yml"),
        ("get_status_failed", "Không lấy được trạng thái"),
        ("project_not_configured", "Dự án chưa được cấu hình"),
        ("run_init_to_configure", "Chạy init để cấu hình dự án"),
        ("unhealthy_hint", "dịch vụ không khỏe mạnh"),
        ("view_logs_hint", "Xem log: docker compose logs"),
        ("access_info", "Thông tin truy cập"),
        ("config_title", "Cấu hình kk"),
        ("config_language", "Ngôn ngữ"),
        ("config_project_dir", "Thư mục dự án"),
        ("config_file_path", "File cấu hình"),
        ("config_not_set", "(chưa đặt)"),
        ("config_saved", "Đã lưu cấu hình"),
        ("to_fix", "Cách sửa"),
        ("then_run", "Sau đó chạy"),
        ("automation_installed", "Đã cài add-on automation"),
        ("automation_exists", "Add-on automation đã tồn tại. Ghi đè?"),
        ("automation_not_installed", "Add-on automation chưa được cài"),
        ("automation_removed", "Đã gỡ containers của add-on automation"),
        ("col_service", "DỊCH VỤ"),
        ("col_status", "TRẠNG THÁI"),
        ("col_health", "SỨC KHỎE"),
        ("col_ports", "CỔNG"),
        ("col_image", "IMAGE"),
        ("status_running", "đang chạy"),
        ("status_stopped", "đã dừng"),
    ])
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_key_falls_back_to_itself() {
        assert_eq!(msg("no_such_key_anywhere"), "no_such_key_anywhere");
    }

    #[test]
    fn test_known_key_resolves() {
        assert_eq!(msg("all_up_to_date"), "All images are up to date");
    }

    #[test]
    fn test_catalogs_cover_the_same_keys() {
        for key in MESSAGES_EN.keys() {
            assert!(MESSAGES_VI.contains_key(key), "vi catalog misses {}", key);
        }
        for key in MESSAGES_VI.keys() {
            assert!(MESSAGES_EN.contains_key(key), "en catalog misses {}", key);
        }
    }
}
