/*
 * Responsibility
 * - middleware の公開インターフェース
 * - http (request id / trace / timeout), cors, pipeline (認証・認可)
 */
pub mod cors;
pub mod http;
pub mod pipeline;
