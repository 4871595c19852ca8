/// 授权状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStatus {
    Unknown,
    Authorized,
    Denied,
}

/// 启动口令门
///
/// 只是一个占位的入口检查，不是身份认证。
#[derive(Debug, Clone)]
pub struct AuthGate {
    password: String,
    status: AuthStatus,
}

impl AuthGate {
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: password.into(),
            status: AuthStatus::Unknown,
        }
    }

    pub fn login(&mut self, input: &str) -> bool {
        self.status = if input == self.password {
            AuthStatus::Authorized
        } else {
            AuthStatus::Denied
        };
        tracing::debug!("Login attempt: {:?}", self.status);
        self.is_authorized()
    }

    pub fn logout(&mut self) {
        self.status = AuthStatus::Unknown;
    }

    pub fn status(&self) -> AuthStatus {
        self.status
    }

    pub fn is_authorized(&self) -> bool {
        self.status == AuthStatus::Authorized
    }
}
