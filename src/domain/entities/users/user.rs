//! 사용자 엔티티 (`users` 컬렉션)

use std::fmt;
use std::str::FromStr;
use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// 사용자 역할
///
/// 문서와 JWT 클레임에는 소문자 문자열로 저장됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Librarian,
    Student,
}

impl UserRole {
    pub const ADMIN: &'static str = "admin";
    pub const LIBRARIAN: &'static str = "librarian";
    pub const STUDENT: &'static str = "student";

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => Self::ADMIN,
            UserRole::Librarian => Self::LIBRARIAN,
            UserRole::Student => Self::STUDENT,
        }
    }

    /// 도서 관리/대출 처리 권한이 있는 역할인지
    pub fn is_staff(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Librarian)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            Self::ADMIN => Ok(UserRole::Admin),
            Self::LIBRARIAN => Ok(UserRole::Librarian),
            Self::STUDENT => Ok(UserRole::Student),
            other => Err(format!("지원하지 않는 역할입니다: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    pub username: String,
    pub display_name: String,
    pub password_hash: String,
    pub role: UserRole,
    /// 학번 (학생 계정에서만 사용, 존재할 때 유일)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<DateTime>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl User {
    pub fn new(
        email: String,
        username: String,
        display_name: String,
        password_hash: String,
        role: UserRole,
    ) -> Self {
        let now = DateTime::now();

        Self {
            id: None,
            email,
            username,
            display_name,
            password_hash,
            role,
            student_number: None,
            department: None,
            is_active: true,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_student_profile(mut self, student_number: Option<String>, department: Option<String>) -> Self {
        self.student_number = student_number;
        self.department = department;
        self
    }

    pub fn id_string(&self) -> Option<String> {
        self.id.as_ref().map(|id| id.to_hex())
    }

    pub fn roles(&self) -> Vec<String> {
        vec![self.role.as_str().to_string()]
    }

    pub fn is_student(&self) -> bool {
        self.role == UserRole::Student
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing_is_case_insensitive() {
        assert_eq!("Librarian".parse::<UserRole>(), Ok(UserRole::Librarian));
        assert_eq!(" student ".parse::<UserRole>(), Ok(UserRole::Student));
        assert!("moderator".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&UserRole::Admin).unwrap(), "\"admin\"");
        assert!(UserRole::Admin.is_staff());
        assert!(UserRole::Librarian.is_staff());
        assert!(!UserRole::Student.is_staff());
    }

    #[test]
    fn test_new_user_is_active() {
        let user = User::new(
            "kim@school.ac.kr".to_string(),
            "kim01".to_string(),
            "김학생".to_string(),
            "hash".to_string(),
            UserRole::Student,
        )
        .with_student_profile(Some("2024001".to_string()), None);

        assert!(user.is_active);
        assert!(user.is_student());
        assert_eq!(user.roles(), vec!["student".to_string()]);
        assert_eq!(user.student_number.as_deref(), Some("2024001"));
    }
}
