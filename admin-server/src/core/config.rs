use crate::auth::JwtConfig;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 服务器配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | ENVIRONMENT | development | 运行环境 |
/// | HTTP_PORT | 8888 | HTTP 服务端口 |
/// | DATABASE_URL | sqlite:./data/admin.db | SQLite 连接串 |
/// | JWT_SECRET | (开发环境自动生成) | HMAC 密钥 |
/// | JWT_ACCESS_MINUTES | 120 | 访问令牌有效期 (分钟) |
/// | JWT_REFRESH_MINUTES | 10080 | 刷新令牌有效期 (分钟) |
/// | JWT_ISSUER | admin-server | 令牌签发者 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_JSON | false | JSON 日志格式 |
/// | LOG_DIR | - | 文件日志目录 (未设置则只输出控制台) |
/// | ADMIN_USERNAME | admin | 初始管理员用户名 |
/// | ADMIN_PASSWORD | admin123 (仅开发环境) | 初始管理员密码 |
#[derive(Debug, Clone)]
pub struct Config {
    /// 运行环境: development | staging | production
    pub environment: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// SQLite DSN
    pub database_url: String,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    pub log_level: String,
    pub log_json: bool,
    pub log_dir: Option<String>,
    /// 空库时创建的管理员账号
    pub admin_username: String,
    pub admin_password: String,
}

impl Config {
    /// Require a secret env var: must be set and non-empty outside development.
    fn require_secret(name: &str, environment: &str, dev_fallback: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                dev_fallback.to_string()
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    /// 从环境变量加载配置
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let secret = Self::require_secret(
            "JWT_SECRET",
            &environment,
            &crate::auth::jwt::generate_printable_secret(),
        )?;
        if secret.len() < 32 && environment != "development" {
            return Err("JWT_SECRET must be at least 32 characters long".into());
        }

        let jwt = JwtConfig {
            secret,
            access_minutes: env_parse("JWT_ACCESS_MINUTES", 120),
            refresh_minutes: env_parse("JWT_REFRESH_MINUTES", 10080),
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "admin-server".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "admin-console".into()),
        };

        Ok(Self {
            http_port: env_parse("HTTP_PORT", 8888),
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:./data/admin.db".into()),
            jwt,
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: env_parse("LOG_JSON", false),
            log_dir: std::env::var("LOG_DIR").ok().filter(|s| !s.is_empty()),
            admin_username: std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".into()),
            admin_password: Self::require_secret("ADMIN_PASSWORD", &environment, "admin123")?,
            environment,
        })
    }

    /// 测试用配置: 内存数据库 + 固定密钥
    pub fn for_tests() -> Self {
        Self {
            environment: "test".into(),
            http_port: 0,
            database_url: "sqlite::memory:".into(),
            jwt: JwtConfig {
                secret: "test-secret-key-that-is-long-enough-0123456789".into(),
                access_minutes: 15,
                refresh_minutes: 60,
                issuer: "admin-server".into(),
                audience: "admin-console".into(),
            },
            log_level: "debug".into(),
            log_json: false,
            log_dir: None,
            admin_username: "admin".into(),
            admin_password: "admin123".into(),
        }
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_parse_falls_back_on_garbage() {
        // Name chosen to never collide with a real variable
        assert_eq!(env_parse("ADMIN_SERVER_TEST_UNSET_PORT", 8888u16), 8888);
    }

    #[test]
    fn test_require_secret_in_production() {
        let err = Config::require_secret("ADMIN_SERVER_TEST_UNSET_SECRET", "production", "x");
        assert!(err.is_err());
        let ok = Config::require_secret("ADMIN_SERVER_TEST_UNSET_SECRET", "development", "dev");
        assert_eq!(ok.unwrap(), "dev");
    }
}
