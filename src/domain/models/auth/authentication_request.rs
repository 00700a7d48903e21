//! 인증 미들웨어 동작 모드와 역할 요구사항

/// 인증 필수 여부
#[derive(Debug, Clone, PartialEq)]
pub enum AuthMode {
    /// 토큰이 없거나 유효하지 않으면 401
    Required,
    /// 토큰이 유효하면 사용자 정보를 저장하고, 없어도 요청 진행
    Optional,
}

/// 라우트 스코프에 필요한 역할
#[derive(Debug, Clone)]
pub enum RequiredRole {
    Single(String),
    Any(Vec<String>),
}

impl RequiredRole {
    pub fn is_satisfied(&self, user_roles: &[String]) -> bool {
        match self {
            RequiredRole::Single(required_role) => user_roles.contains(required_role),
            RequiredRole::Any(required_roles) => {
                required_roles.iter().any(|role| user_roles.contains(role))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_role_single() {
        let required = RequiredRole::Single("admin".to_string());

        assert!(required.is_satisfied(&["admin".to_string()]));
        assert!(!required.is_satisfied(&["librarian".to_string()]));
    }

    #[test]
    fn test_required_role_any() {
        let required = RequiredRole::Any(vec!["admin".to_string(), "librarian".to_string()]);

        assert!(required.is_satisfied(&["librarian".to_string()]));
        assert!(required.is_satisfied(&["admin".to_string()]));
        assert!(!required.is_satisfied(&["student".to_string()]));
        assert!(!required.is_satisfied(&[]));
    }
}
