//! JWT 令牌服务
//!
//! 处理访问令牌 / 刷新令牌的生成、验证和解析。

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const TOKEN_TYPE_ACCESS: &str = "access";
pub const TOKEN_TYPE_REFRESH: &str = "refresh";

/// JWT 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// JWT 密钥
    pub secret: String,
    /// 访问令牌有效期 (分钟)
    pub access_minutes: i64,
    /// 刷新令牌有效期 (分钟)
    pub refresh_minutes: i64,
    /// 令牌签发者
    pub issuer: String,
    /// 令牌受众
    pub audience: String,
}

/// 存储在令牌中的 JWT Claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// 用户 ID (Subject)
    pub sub: String,
    /// 用户名
    pub username: String,
    /// 角色 ID (0 = 超级管理员)
    #[serde(rename = "roleId")]
    pub role_id: i64,
    /// 令牌类型: access | refresh
    pub token_type: String,
    /// 过期时间戳
    pub exp: i64,
    /// 签发时间戳
    pub iat: i64,
    /// 签发者
    pub iss: String,
    /// 受众
    pub aud: String,
}

/// JWT 错误
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("无效令牌: {0}")]
    InvalidToken(String),

    #[error("令牌已过期")]
    ExpiredToken,

    #[error("无效签名")]
    InvalidSignature,

    #[error("令牌类型错误: 期望 {expected}")]
    WrongTokenType { expected: &'static str },

    #[error("令牌生成失败: {0}")]
    GenerationFailed(String),
}

/// 生成可打印的随机 JWT 密钥 (用于开发环境)
pub fn generate_printable_secret() -> String {
    const ALLOWED: &[u8] =
        b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*()-_=+";
    let mut rng = rand::thread_rng();
    (0..64)
        .map(|_| ALLOWED[rng.gen_range(0..ALLOWED.len())] as char)
        .collect()
}

/// 一次登录签发的令牌对
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// 访问令牌剩余秒数
    pub expires_in: i64,
}

/// JWT 令牌服务
#[derive(Clone)]
pub struct JwtService {
    pub config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("issuer", &self.config.issuer)
            .field("audience", &self.config.audience)
            .finish_non_exhaustive()
    }
}

impl JwtService {
    /// 使用指定配置创建新的 JWT 服务
    pub fn with_config(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    fn generate(
        &self,
        user_id: i64,
        username: &str,
        role_id: i64,
        token_type: &str,
        minutes: i64,
    ) -> Result<String, JwtError> {
        let now = Utc::now();
        let expiration = now + Duration::minutes(minutes);

        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            role_id,
            token_type: token_type.to_string(),
            exp: expiration.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    /// 为用户签发访问令牌 + 刷新令牌
    pub fn issue_pair(
        &self,
        user_id: i64,
        username: &str,
        role_id: i64,
    ) -> Result<TokenPair, JwtError> {
        Ok(TokenPair {
            access_token: self.generate(
                user_id,
                username,
                role_id,
                TOKEN_TYPE_ACCESS,
                self.config.access_minutes,
            )?,
            refresh_token: self.generate(
                user_id,
                username,
                role_id,
                TOKEN_TYPE_REFRESH,
                self.config.refresh_minutes,
            )?,
            expires_in: self.config.access_minutes * 60,
        })
    }

    /// 验证并解码令牌 (不检查类型)
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss", "aud"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                ErrorKind::InvalidToken => JwtError::InvalidToken(e.to_string()),
                _ => JwtError::InvalidToken(format!("Token validation failed: {}", e)),
            }
        })?;

        Ok(token_data.claims)
    }

    /// 验证访问令牌 (拒绝刷新令牌)
    pub fn validate_access(&self, token: &str) -> Result<Claims, JwtError> {
        self.validate_typed(token, TOKEN_TYPE_ACCESS)
    }

    /// 验证刷新令牌 (拒绝访问令牌)
    pub fn validate_refresh(&self, token: &str) -> Result<Claims, JwtError> {
        self.validate_typed(token, TOKEN_TYPE_REFRESH)
    }

    fn validate_typed(&self, token: &str, expected: &'static str) -> Result<Claims, JwtError> {
        let claims = self.validate_token(token)?;
        if claims.token_type != expected {
            return Err(JwtError::WrongTokenType { expected });
        }
        Ok(claims)
    }

    /// 从 Authorization 头提取令牌
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ").map(str::trim).filter(|t| !t.is_empty())
    }
}

/// 当前用户上下文 (从 JWT Claims 解析)
///
/// 由认证中间件创建，注入到请求扩展中
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
    pub role_id: i64,
}

impl CurrentUser {
    /// 是否超级管理员 (roleId = 0)
    pub fn is_superuser(&self) -> bool {
        self.role_id == 0
    }
}

impl TryFrom<Claims> for CurrentUser {
    type Error = JwtError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let id = claims
            .sub
            .parse()
            .map_err(|_| JwtError::InvalidToken(format!("Invalid subject: {}", claims.sub)))?;
        Ok(Self {
            id,
            username: claims.username,
            role_id: claims.role_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::with_config(JwtConfig {
            secret: generate_printable_secret(),
            access_minutes: 5,
            refresh_minutes: 60,
            issuer: "admin-server".into(),
            audience: "admin-console".into(),
        })
    }

    #[test]
    fn test_issue_and_validate_pair() {
        let service = service();
        let pair = service.issue_pair(7, "alice", 3).expect("issue pair");
        assert_eq!(pair.expires_in, 300);

        let claims = service.validate_access(&pair.access_token).expect("access");
        assert_eq!(claims.sub, "7");
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.role_id, 3);

        let user = CurrentUser::try_from(claims).expect("current user");
        assert_eq!(user.id, 7);
        assert!(!user.is_superuser());
    }

    #[test]
    fn test_token_types_are_not_interchangeable() {
        let service = service();
        let pair = service.issue_pair(1, "admin", 0).expect("issue pair");
        assert!(matches!(
            service.validate_access(&pair.refresh_token),
            Err(JwtError::WrongTokenType { .. })
        ));
        assert!(matches!(
            service.validate_refresh(&pair.access_token),
            Err(JwtError::WrongTokenType { .. })
        ));
        assert!(service.validate_refresh(&pair.refresh_token).is_ok());
    }

    #[test]
    fn test_foreign_secret_rejected() {
        let pair = service().issue_pair(1, "admin", 0).expect("issue pair");
        assert!(service().validate_access(&pair.access_token).is_err());
    }

    #[test]
    fn test_expired_token() {
        let mut config = service().config;
        config.access_minutes = -10;
        let service = JwtService::with_config(config);
        let pair = service.issue_pair(1, "admin", 0).expect("issue pair");
        assert!(matches!(
            service.validate_access(&pair.access_token),
            Err(JwtError::ExpiredToken)
        ));
    }

    #[test]
    fn test_extract_from_header() {
        assert_eq!(JwtService::extract_from_header("Bearer abc"), Some("abc"));
        assert_eq!(JwtService::extract_from_header("Bearer "), None);
        assert_eq!(JwtService::extract_from_header("Basic abc"), None);
    }
}
