//! 시작 단계 콘솔 출력 도우미
//!
//! 레지스트리 초기화 진행 상황과 서버 설정 요약을 박스 형태로 출력합니다.

const BOX_WIDTH: usize = 50;

pub fn print_boxed_title(title: &str) {
    let border = "═".repeat(BOX_WIDTH);

    println!("╔{}╗", border);
    println!("║{:^49}║", title);
    println!("╚{}╝", border);
}

pub fn print_step_start(step: u8, description: &str) {
    println!("→ Step {}: {}", step, description);
}

pub fn print_step_complete(step: u8, description: &str, count: usize) {
    println!("✓ Step {}: {} ({} items)", step, description, count);
}

pub fn print_sub_task(name: &str, status: &str) {
    println!("   ├─ {}: {}", name, status);
}

pub fn print_final_summary(repos: usize, services: usize) {
    println!();
    print_boxed_title("🎉 SERVICE REGISTRY INITIALIZED");
    println!("   📦 Repositories: {}", repos);
    println!("   🔧 Services: {}", services);
    println!("   🚀 Total Components: {}", repos + services);
    println!();
}

pub fn print_cache_initialized(cache_type: &str, count: usize) {
    println!("   ├─ {} Cache: {} entries loaded", cache_type, count);
}

/// 키-값 목록을 정렬된 두 열로 출력
pub fn print_key_values(title: &str, rows: &[(&str, String)]) {
    print_boxed_title(title);
    for line in format_key_values(rows) {
        println!("{}", line);
    }
    println!();
}

fn format_key_values(rows: &[(&str, String)]) -> Vec<String> {
    let key_width = rows.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0);

    rows.iter()
        .map(|(key, value)| format!("   {:<width$} : {}", key, value, width = key_width))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_values_are_aligned() {
        let lines = format_key_values(&[
            ("loan_period_days", "14".to_string()),
            ("fine", "1.00".to_string()),
        ]);

        assert_eq!(lines[0], "   loan_period_days : 14");
        assert_eq!(lines[1], "   fine             : 1.00");
    }
}
