//! End-to-end tests: register resources on a `TypedApi` and drive them
//! through `handle`, the same path the HTTP server uses.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use ferrule_api::{
    located, ApiConfig, ArgValue, Arguments, BadRequestError, CustomResponse, ErrorRef, FieldDescriptor, Handler,
    HttpError, HttpMethod, Methods, ModelConfig, NotFoundError, Param, RegistrationError, Reply, Request,
    RequestParser, Response, ResponseType, ScalarKind, StructuredModel, TypeDescriptor, TypeRef, TypedApi, TypedBlueprint,
    TypedResource,
};
use ferrule_api::openapi::{Parameter, ParameterIn, Schema};
use ferrule_api::ParameterLocation;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// ============================================================================
// Users
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
struct User {
    id: i64,
    name: String,
    age: i64,
    join_date: NaiveDate,
}

impl StructuredModel for User {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::object(
            "User",
            vec![
                FieldDescriptor::new("id", TypeDescriptor::int()),
                FieldDescriptor::new("name", TypeDescriptor::string()),
                FieldDescriptor::new("age", TypeDescriptor::int()),
                FieldDescriptor::new("join_date", TypeDescriptor::Date),
            ],
        )
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct UserCreateBody {
    name: String,
    age: i64,
}

impl StructuredModel for UserCreateBody {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::object(
            "UserCreateBody",
            vec![
                FieldDescriptor::new("name", TypeDescriptor::string()),
                FieldDescriptor::new("age", TypeDescriptor::int()),
            ],
        )
    }
}

#[derive(Default)]
struct UserResource;

impl UserResource {
    fn get(&self, args: &Arguments) -> Result<Reply, HttpError> {
        let user_id: Option<i64> = args.get("user_id")?;
        let name: Option<String> = args.get("name")?;
        let age_gt: Option<i64> = args.get("age_gt")?;
        let join_date: Option<NaiveDate> = args.get("join_date")?;

        Reply::model(&User {
            id: user_id.unwrap_or(0),
            name: name.unwrap_or_else(|| "default".to_string()),
            age: match age_gt {
                Some(age) if age < 10 => 10,
                _ => 5,
            },
            join_date: join_date.unwrap_or_else(|| NaiveDate::from_ymd_opt(2000, 1, 1).unwrap()),
        })
    }

    fn post(&self, args: &Arguments) -> Result<Reply, HttpError> {
        let body: UserCreateBody = args.get("user")?;
        Reply::model(&User {
            id: 0,
            name: body.name,
            age: body.age,
            join_date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
        })
    }
}

impl TypedResource for UserResource {
    fn methods(methods: &mut Methods<Self>) {
        methods
            .get(
                Handler::new(Self::get)
                    .doc(
                        "Retrieves user

                        User can be queried with query parameters

                        :param user_id: User ID
                        :param name: First name
                        :param age_gt: Age
                        :param join_date: Join date
                        :return: User details",
                    )
                    .param(Param::new("user_id", TypeRef::int().nullable()).default(ArgValue::Null))
                    .param(Param::new("name", TypeRef::string().nullable()).default(ArgValue::Null))
                    .param(Param::new("age_gt", TypeRef::int().nullable()).default(ArgValue::Null))
                    .param(Param::new("join_date", TypeRef::date().nullable()).default(ArgValue::Null))
                    .returns(ResponseType::model::<User>()),
            )
            .post(
                Handler::new(Self::post)
                    .doc(
                        "Creates a user

                        :param user: User details
                        :return: Created user object",
                    )
                    .param(Param::new("user", TypeRef::model::<UserCreateBody>()))
                    .returns(ResponseType::model::<User>()),
            );
    }
}

// ============================================================================
// Todo list
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
struct BlogPost {
    id: i64,
    content: String,
    due_time: DateTime<Utc>,
    language: String,
}

impl StructuredModel for BlogPost {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::object(
            "BlogPost",
            vec![
                FieldDescriptor::new("id", TypeDescriptor::int()),
                FieldDescriptor::new("content", TypeDescriptor::string()),
                FieldDescriptor::new("due_time", TypeDescriptor::DateTime),
                FieldDescriptor::new("language", TypeDescriptor::string()),
            ],
        )
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct BlogPostListResponse {
    count: i64,
    items: Vec<BlogPost>,
}

impl StructuredModel for BlogPostListResponse {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::object(
            "BlogPostListResponse",
            vec![
                FieldDescriptor::new("count", TypeDescriptor::int()),
                FieldDescriptor::new("items", TypeDescriptor::list(BlogPost::type_descriptor())),
            ],
        )
    }

    fn config() -> ModelConfig {
        ModelConfig { status_code: 200 }
    }
}

#[derive(Debug)]
struct BlogPostListQuery {
    date_begin: NaiveDate,
    date_end: Option<NaiveDate>,
}

impl RequestParser for BlogPostListQuery {
    const LOCATION: ParameterLocation = ParameterLocation::Query;

    fn parse(request: &Request) -> Result<Self, Vec<String>> {
        let parse = |key: &str| {
            request
                .query_param(key)
                .map(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| format!("{}: {}", key, e)))
                .transpose()
        };
        let (after, before) = (parse("after"), parse("before"));
        let errors: Vec<String> = [&after, &before]
            .into_iter()
            .filter_map(|result| result.as_ref().err().cloned())
            .collect();
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Self {
            date_begin: after
                .ok()
                .flatten()
                .unwrap_or_else(|| NaiveDate::from_ymd_opt(2000, 1, 1).unwrap()),
            date_end: before.ok().flatten(),
        })
    }

    fn parameters() -> Vec<Parameter> {
        ["after", "before"]
            .into_iter()
            .map(|name| Parameter::new(name, ParameterIn::Query, Schema::string().format("date")))
            .collect()
    }
}

/// Id of a created item, returned as a bare JSON integer
struct ItemId(i64);

impl CustomResponse for ItemId {
    const MIME_TYPE: &'static str = "application/json";

    fn schema() -> Value {
        json!({"type": "integer"})
    }

    fn into_response(self) -> Response {
        Response::json_value(Self::STATUS_CODE, &json!(self.0))
    }
}

#[derive(Default)]
struct TodoListResource;

impl TodoListResource {
    fn get(&self, args: &Arguments) -> Result<Reply, HttpError> {
        let query: &BlogPostListQuery = args.parsed("query")?;
        let language: String = args.get("accept_language")?;
        assert!(query.date_end.map_or(true, |end| end >= query.date_begin));

        let post = |id, content: &str, day| BlogPost {
            id,
            content: content.to_string(),
            due_time: Utc.with_ymd_and_hms(1990, 10, day, 0, 0, 0).unwrap(),
            language: language.clone(),
        };
        Reply::model(&BlogPostListResponse {
            count: 2,
            items: vec![post(1, "Write tests", 10), post(2, "Write more tests", 11)],
        })
    }

    fn post(&self, args: &Arguments) -> Result<Reply, HttpError> {
        let item: BlogPost = args.get("new_item")?;
        if item.id < 0 {
            return Err(BadRequestError.into());
        }
        Ok(Reply::custom(ItemId(item.id)))
    }
}

impl TypedResource for TodoListResource {
    fn methods(methods: &mut Methods<Self>) {
        methods
            .get(
                Handler::new(Self::get)
                    .doc(
                        "Todo List Resource

                        :return BlogPostListResponse: Todo List
                        :raises NotFoundError: No todo item has been found",
                    )
                    .parser::<BlogPostListQuery>("query")
                    .param(Param::new("accept_language", located::header(TypeRef::string())))
                    .returns(ResponseType::model::<BlogPostListResponse>())
                    .raises(ErrorRef::of::<NotFoundError>()),
            )
            .post(
                Handler::new(Self::post)
                    .doc(
                        "Create new Todo item

                        :return ItemId: Created item id
                        :raises BadRequestError: Failed to create new item",
                    )
                    .param(Param::new("new_item", TypeRef::model::<BlogPost>()))
                    .returns(ResponseType::custom::<ItemId>())
                    .raises(ErrorRef::of::<BadRequestError>()),
            );
    }
}

// ============================================================================
// Jobs
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
struct JobResult {
    #[serde(rename = "date")]
    job_date: NaiveDate,
    id: i64,
    success: bool,
}

impl StructuredModel for JobResult {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::object(
            "JobResult",
            vec![
                FieldDescriptor::new("job_date", TypeDescriptor::Date).alias("date"),
                FieldDescriptor::new("id", TypeDescriptor::int()),
                FieldDescriptor::new("success", TypeDescriptor::Bool),
            ],
        )
    }
}

#[derive(Default)]
struct JobsResource;

impl TypedResource for JobsResource {
    fn methods(methods: &mut Methods<Self>) {
        methods.post(
            Handler::new(|_: &Self, args: &Arguments| {
                Reply::model(&JobResult {
                    id: args.get("job_id")?,
                    job_date: args.get("job_date")?,
                    success: true,
                })
            })
            .doc(
                "Runs a job

                :param job_id: Job Type ID
                :param job_date: The date the job will be run for
                :return: Job result",
            )
            .param(Param::new("job_id", TypeRef::int()))
            .param(Param::new("job_date", TypeRef::date()))
            .returns(ResponseType::model::<JobResult>()),
        );
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn test_api() -> TypedApi {
    let mut api = TypedApi::new(ApiConfig::new("Test API"));
    api.add_resource::<UserResource>("/users").unwrap();
    api.add_resource::<TodoListResource>("/todo").unwrap();
    api.add_resource::<JobsResource>("/jobs/<int:job_id>/<job_date>").unwrap();
    api
}

fn docs(api: &TypedApi) -> Value {
    let response = api.handle(Request::new(HttpMethod::Get, "/openapi"));
    assert_eq!(response.status, 200);
    response.json().unwrap()
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_query_parameter() {
    let api = test_api();
    let response = api.handle(Request::new(HttpMethod::Get, "/users").with_query_param("user_id", "123"));

    assert_eq!(response.status, 200);
    let body = response.json().unwrap();
    assert_eq!(body["id"], 123);
    assert_eq!(body["name"], "default");
}

#[test]
fn test_query_parameter_int_validation_fail() {
    let api = test_api();
    let response = api.handle(Request::new(HttpMethod::Get, "/users").with_query_param("user_id", "test"));

    assert_eq!(response.status, 422);
    let errors = response.json().unwrap()["errors"].clone();
    assert_eq!(errors.as_array().unwrap().len(), 1);
    assert_eq!(errors[0]["parameter"], "user_id");
    assert_eq!(errors[0]["location"], "query");
}

#[test]
fn test_query_parameter_date() {
    let api = test_api();
    let response = api.handle(Request::new(HttpMethod::Get, "/users").with_query_param("join_date", "2000-01-02"));

    assert_eq!(response.status, 200);
    let body = response.json().unwrap();
    assert_eq!(body["id"], 0);
    assert_eq!(body["name"], "default");
    assert_eq!(body["join_date"], "2000-01-02");
}

#[test]
fn test_every_failure_is_reported() {
    let api = test_api();
    let request = Request::new(HttpMethod::Get, "/users")
        .with_query_param("user_id", "x")
        .with_query_param("age_gt", "old")
        .with_query_param("join_date", "yesterday");
    let response = api.handle(request);

    assert_eq!(response.status, 422);
    let body = response.json().unwrap();
    let names: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["parameter"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["user_id", "age_gt", "join_date"]);
}

#[test]
fn test_header_parameter_str() {
    let api = test_api();
    let response = api.handle(Request::new(HttpMethod::Get, "/todo").with_header("Accept-Language", "en-US"));

    assert_eq!(response.status, 200);
    assert_eq!(response.json().unwrap()["items"][0]["language"], "en-US");
}

#[test]
fn test_header_parameter_validation_fail_missing() {
    let api = test_api();
    let response = api.handle(Request::new(HttpMethod::Get, "/todo"));

    assert_eq!(response.status, 422);
    let errors = response.json().unwrap()["errors"].clone();
    assert_eq!(errors.as_array().unwrap().len(), 1);
    assert_eq!(errors[0]["parameter"], "Accept-Language");
    assert_eq!(errors[0]["location"], "header");
    assert_eq!(errors[0]["details"][0], "Parameter is not optional");
}

#[test]
fn test_parser_failure_follows_parameter_failures() {
    let api = test_api();
    let response = api.handle(Request::new(HttpMethod::Get, "/todo").with_query_param("after", "soon"));

    assert_eq!(response.status, 422);
    let errors = response.json().unwrap()["errors"].clone();
    assert_eq!(errors[0]["parameter"], "Accept-Language");
    assert_eq!(errors[1]["parameter"], "query");
    assert_eq!(errors[1]["location"], "query");
}

#[test]
fn test_path_parameter_date() {
    let api = test_api();
    let response = api.handle(Request::new(HttpMethod::Post, "/jobs/13/2000-01-02"));

    assert_eq!(response.status, 200);
    let body = response.json().unwrap();
    assert_eq!(body["id"], 13);
    assert_eq!(body["date"], "2000-01-02");
    assert_eq!(body["success"], true);
}

#[test]
fn test_path_parameter_validation_fail() {
    let api = test_api();
    let response = api.handle(Request::new(HttpMethod::Post, "/jobs/abc/2000-01-02"));

    assert_eq!(response.status, 422);
    let errors = response.json().unwrap()["errors"].clone();
    assert_eq!(errors[0]["parameter"], "job_id");
    assert_eq!(errors[0]["location"], "path");
}

#[test]
fn test_body_parameter() {
    let api = test_api();
    let request = Request::new(HttpMethod::Post, "/users").with_json(&json!({"name": "Ada", "age": 36}));
    let response = api.handle(request);
    assert_eq!(response.status, 200);
    assert_eq!(response.json().unwrap()["name"], "Ada");

    let request = Request::new(HttpMethod::Post, "/users").with_json(&json!({"name": "Ada", "age": "old"}));
    let response = api.handle(request);
    assert_eq!(response.status, 422);
    let errors = response.json().unwrap()["errors"].clone();
    assert_eq!(errors[0]["parameter"], "user");
    assert_eq!(errors[0]["location"], "body");
}

// ============================================================================
// Errors and routing
// ============================================================================

#[test]
fn test_error_response_todo_item() {
    let api = test_api();
    let request = Request::new(HttpMethod::Post, "/todo").with_json(&json!({
        "id": -1,
        "content": "do it",
        "due_time": "2022-02-22T22:20:22Z",
        "language": "en-US"
    }));
    let response = api.handle(request);

    assert_eq!(response.status, 400);
    assert_eq!(response.json().unwrap(), json!({"message": "Bad request"}));
}

#[test]
fn test_custom_response() {
    let api = test_api();
    let request = Request::new(HttpMethod::Post, "/todo").with_json(&json!({
        "id": 7,
        "content": "do it",
        "due_time": "2022-02-22T22:20:22Z",
        "language": "en-US"
    }));
    let response = api.handle(request);

    assert_eq!(response.status, 200);
    assert_eq!(response.json().unwrap(), json!(7));
}

#[test]
fn test_method_not_allowed() {
    let api = test_api();
    let response = api.handle(Request::new(HttpMethod::Delete, "/users"));

    assert_eq!(response.status, 405);
    assert_eq!(response.headers.get("allow").map(String::as_str), Some("GET, POST"));
}

#[test]
fn test_unknown_route() {
    let api = test_api();
    let response = api.handle(Request::new(HttpMethod::Get, "/nothing/here"));
    assert_eq!(response.status, 404);
}

#[test]
fn test_duplicate_path() {
    let mut api = test_api();
    let err = api.add_resource::<JobsResource>("/users").err().unwrap();
    assert_eq!(err, RegistrationError::DuplicatePath("/users".to_string()));
    assert_eq!(err.to_string(), "URL is already registered: /users");

    let err = api.add_resource::<JobsResource>("/openapi").err().unwrap();
    assert_eq!(err, RegistrationError::DuplicatePath("/openapi".to_string()));
}

#[test]
fn test_blueprint() {
    let mut blueprint = TypedBlueprint::new();
    blueprint
        .add_resource::<UserResource>("/users")
        .add_resource::<JobsResource>("jobs/<int:job_id>/<job_date>");
    assert_eq!(blueprint.len(), 2);

    let mut api = TypedApi::new(ApiConfig::new("Blueprints"));
    api.register_blueprint(&blueprint, "/v1/").unwrap();

    let response = api.handle(Request::new(HttpMethod::Get, "/v1/users"));
    assert_eq!(response.status, 200);
    let response = api.handle(Request::new(HttpMethod::Post, "/v1/jobs/1/2020-05-06"));
    assert_eq!(response.status, 200);

    let docs = docs(&api);
    assert!(docs["paths"]["/v1/jobs/{job_id}/{job_date}"]["post"].is_object());
}

// ============================================================================
// Documentation
// ============================================================================

#[test]
fn test_simple_user_get_docs() {
    let docs = docs(&test_api());
    let get_op = &docs["paths"]["/users"]["get"];

    assert_eq!(get_op["summary"], "Retrieves user");
    assert_eq!(get_op["description"], "User can be queried with query parameters");

    let parameters: Vec<&Value> = get_op["parameters"].as_array().unwrap().iter().collect();
    let param = |name: &str| *parameters.iter().find(|p| p["name"] == name).unwrap();

    assert_eq!(param("user_id")["description"], "User ID");
    assert_eq!(param("user_id")["schema"]["type"], "integer");
    assert_eq!(param("user_id")["in"], "query");
    assert_eq!(param("user_id")["required"], false);
    // a null default is not documented
    assert!(param("user_id")["schema"].get("default").is_none());

    assert_eq!(param("name")["description"], "First name");
    assert_eq!(param("name")["schema"]["type"], "string");
    assert_eq!(param("join_date")["schema"]["format"], "date");

    let success = &get_op["responses"]["200"];
    assert_eq!(success["description"], "User details");
    assert_eq!(success["content"]["application/json"]["schema"]["$ref"], "#/components/schemas/User");
}

#[test]
fn test_request_body_docs() {
    let docs = docs(&test_api());
    let post_op = &docs["paths"]["/users"]["post"];

    assert!(post_op.get("parameters").is_none());
    assert_eq!(post_op["requestBody"]["required"], true);
    assert_eq!(
        post_op["requestBody"]["content"]["application/json"]["schema"]["$ref"],
        "#/components/schemas/UserCreateBody"
    );
    assert_eq!(docs["components"]["schemas"]["UserCreateBody"]["title"], "UserCreateBody");
    assert_eq!(post_op["responses"]["200"]["description"], "Created user object");
}

#[test]
fn test_status_code_with_model_config() {
    let docs = docs(&test_api());
    let success = &docs["paths"]["/todo"]["get"]["responses"]["200"];

    assert_eq!(
        success["content"]["application/json"]["schema"]["$ref"],
        "#/components/schemas/BlogPostListResponse"
    );
    assert_eq!(success["description"], "Todo List");
}

#[test]
fn test_error_docs() {
    let docs = docs(&test_api());
    let not_found = &docs["paths"]["/todo"]["get"]["responses"]["404"];
    assert_eq!(not_found["description"], "No todo item has been found");
    assert_eq!(not_found["content"]["application/json"]["schema"]["title"], "NotFoundError");

    let bad_request = &docs["paths"]["/todo"]["post"]["responses"]["400"];
    assert_eq!(bad_request["description"], "Failed to create new item");
    assert_eq!(
        bad_request["content"]["application/json"]["schema"]["properties"]["message"]["default"],
        "Bad request"
    );
}

#[test]
fn test_header_and_parser_docs() {
    let docs = docs(&test_api());
    let parameters = docs["paths"]["/todo"]["get"]["parameters"].as_array().unwrap().clone();

    let names: Vec<&str> = parameters.iter().map(|p| p["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Accept-Language", "after", "before"]);
    assert_eq!(parameters[0]["in"], "header");
    assert_eq!(parameters[0]["required"], true);
    assert_eq!(parameters[1]["schema"]["format"], "date");
}

#[test]
fn test_custom_response_docs() {
    let docs = docs(&test_api());
    let created = &docs["paths"]["/todo"]["post"]["responses"]["200"];
    assert_eq!(created["description"], "Created item id");
    assert_eq!(created["content"]["application/json"]["schema"]["type"], "integer");
}

#[test]
fn test_path_docs() {
    let docs = docs(&test_api());
    let post_op = &docs["paths"]["/jobs/{job_id}/{job_date}"]["post"];

    let parameters = post_op["parameters"].as_array().unwrap();
    assert_eq!(parameters[0]["name"], "job_id");
    assert_eq!(parameters[0]["in"], "path");
    assert_eq!(parameters[0]["description"], "Job Type ID");
    assert_eq!(parameters[1]["schema"]["format"], "date");
    assert_eq!(post_op["responses"]["200"]["description"], "Job result");
}

#[derive(Default)]
struct FeedResource;

impl TypedResource for FeedResource {
    fn methods(methods: &mut Methods<Self>) {
        methods.get(
            Handler::new(|_: &Self, _: &Arguments| Ok(Reply::json(json!([]))))
                .doc(
                    "Feed

                    :return BlogPost: A single post
                    :return BlogPostListResponse: A page of posts",
                )
                .returns(ResponseType::model::<BlogPost>())
                .returns(ResponseType::model::<BlogPostListResponse>())
                .returns(ResponseType::raw("text/csv")),
        );
    }
}

#[test]
fn test_union_response_docs() {
    let mut api = TypedApi::new(ApiConfig::new("Feed"));
    api.add_resource::<FeedResource>("/feed").unwrap();
    let docs = docs(&api);
    let success = &docs["paths"]["/feed"]["get"]["responses"]["200"];

    let one_of = success["content"]["application/json"]["schema"]["oneOf"].as_array().unwrap();
    assert_eq!(one_of.len(), 2);
    assert_eq!(one_of[0]["$ref"], "#/components/schemas/BlogPost");
    assert_eq!(one_of[1]["$ref"], "#/components/schemas/BlogPostListResponse");
    assert_eq!(success["description"], "A single post");
    assert!(success["content"]["text/csv"].is_object());
}

#[derive(Default)]
struct ErrorsOnly;

impl TypedResource for ErrorsOnly {
    fn methods(methods: &mut Methods<Self>) {
        methods.get(
            Handler::new(|_: &Self, _: &Arguments| Err(NotFoundError.into()))
                .returns(ResponseType::error::<NotFoundError>()),
        );
    }
}

#[test]
fn test_handler_without_success_response() {
    let mut api = TypedApi::new(ApiConfig::new("Broken"));
    let err = api.add_resource::<ErrorsOnly>("/broken").err().unwrap();
    assert!(matches!(err, RegistrationError::NoSuccessResponse { .. }));
}

#[test]
fn test_docs_page() {
    let api = TypedApi::new(ApiConfig::new("Docs").openapi_path("/spec").docs_path("/redoc"));
    let response = api.handle(Request::new(HttpMethod::Get, "/redoc"));
    assert_eq!(response.status, 200);
    assert!(response.text_body().contains("<redoc spec-url='/spec'>"));
    assert_eq!(docs_at(&api, "/spec")["info"]["title"], "Docs");
}

fn docs_at(api: &TypedApi, path: &str) -> Value {
    api.handle(Request::new(HttpMethod::Get, path)).json().unwrap()
}

// ============================================================================
// Custom coercions
// ============================================================================

#[derive(Default)]
struct PaletteResource;

impl TypedResource for PaletteResource {
    fn methods(methods: &mut Methods<Self>) {
        methods.get(
            Handler::new(|_: &Self, args: &Arguments| {
                let color: String = args.get("color")?;
                Ok(Reply::json(json!({ "color": color })))
            })
            .param(Param::new("color", TypeRef::custom("color")).default("blue"))
            .returns(ResponseType::raw("application/json")),
        );
    }
}

fn palette_api(calls: Arc<AtomicUsize>) -> TypedApi {
    let mut api = TypedApi::new(ApiConfig::new("Palette"));
    api.coercions_mut()
        .register(ScalarKind::Custom("color".to_string()), move |raw| {
            calls.fetch_add(1, Ordering::SeqCst);
            if raw == "red" {
                Ok(ArgValue::from("red"))
            } else {
                Err(format!("unknown color '{}'", raw))
            }
        });
    api.add_resource::<PaletteResource>("/palette").unwrap();
    api
}

#[test]
fn test_custom_coercion_skipped_for_default() {
    let calls = Arc::new(AtomicUsize::new(0));
    let api = palette_api(calls.clone());

    let response = api.handle(Request::new(HttpMethod::Get, "/palette"));
    assert_eq!(response.status, 200);
    assert_eq!(response.json().unwrap()["color"], "blue");
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let response = api.handle(Request::new(HttpMethod::Get, "/palette").with_query_param("color", "red"));
    assert_eq!(response.json().unwrap()["color"], "red");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_custom_coercion_error_in_details() {
    let calls = Arc::new(AtomicUsize::new(0));
    let api = palette_api(calls.clone());

    let response = api.handle(Request::new(HttpMethod::Get, "/palette").with_query_param("color", "green"));
    assert_eq!(response.status, 422);
    let error = &response.json().unwrap()["errors"][0];
    assert_eq!(error["parameter"], "color");
    assert_eq!(error["location"], "query");
    assert_eq!(error["details"], json!(["unknown color 'green'"]));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

// ============================================================================
// Component names
// ============================================================================

mod legacy {
    use super::*;

    /// Older account shape published under the same component name
    #[derive(Debug, Serialize, Deserialize)]
    pub struct User {
        pub login: String,
    }

    impl StructuredModel for User {
        fn type_descriptor() -> TypeDescriptor {
            TypeDescriptor::object("User", vec![FieldDescriptor::new("login", TypeDescriptor::string())])
        }
    }

    #[derive(Default)]
    pub struct LegacyUserResource;

    impl TypedResource for LegacyUserResource {
        fn methods(methods: &mut Methods<Self>) {
            methods.get(
                Handler::new(|_: &Self, _: &Arguments| Reply::model(&User { login: "root".to_string() }))
                    .returns(ResponseType::model::<User>()),
            );
        }
    }
}

#[test]
fn test_component_name_conflict() {
    let mut api = test_api();
    let err = api.add_resource::<legacy::LegacyUserResource>("/legacy").err().unwrap();
    assert_eq!(
        err,
        RegistrationError::SchemaNameConflict {
            name: "User".to_string()
        }
    );

    // Rejected resource is not routed and the original component is kept
    let response = api.handle(Request::new(HttpMethod::Get, "/legacy"));
    assert_eq!(response.status, 404);
    let docs = docs(&api);
    assert!(docs["paths"].get("/legacy").is_none());
    assert!(docs["components"]["schemas"]["User"]["properties"]["join_date"].is_object());
}

#[test]
fn test_shared_component_registers_once() {
    let mut api = test_api();
    api.add_resource::<UserResource>("/people").unwrap();
    let docs = docs(&api);
    assert!(docs["paths"]["/people"]["get"].is_object());
    assert_eq!(docs["components"]["schemas"]["User"]["title"], "User");
}
