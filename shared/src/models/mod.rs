//! Domain models shared by the server and its clients

pub mod menu;
pub mod role;
pub mod tools;
pub mod user;

pub use menu::{Menu, MenuCreate, MenuMeta, MenuNode, MenuUpdate, RouteRecord, count_nodes};
pub use role::{
    ApiGrant, AssignApisRequest, AssignMenusRequest, DataScope, Role, RoleCreate, RoleQuery,
    RoleUpdate,
};
pub use tools::{ExecuteSqlRequest, GenRequest, GeneratedFile, SqlResult, TableColumn};
pub use user::{
    ChangePasswordRequest, LoginRequest, LoginResponse, RefreshRequest, ResetPasswordRequest,
    User, UserCreate, UserQuery, UserUpdate,
};
