//! Ticket endpoints.

use reqwest::blocking::multipart::{Form, Part};
use reqwest::{Method, StatusCode};

use super::*;
use crate::model::{Ticket, TicketId, TicketUpdate, UserId, UserRef};

impl ApiClient {
    /// Ticket ids owned by `user`, or by the caller when `None`.
    pub fn list_tickets(&self, user: Option<UserId>) -> ApiResult<Vec<TicketId>> {
        let user = UserRef::from_option(user);
        let resp = self.send(
            self.request(Method::GET, &format!("/ticket/{}", user)),
            "list tickets",
        )?;
        self.json(resp, "parse ticket list")
    }

    /// Uploads every part in a single multipart request and returns the new
    /// ticket id.
    pub fn upload_ticket(&self, files: &[UploadPart], public: bool) -> ApiResult<TicketId> {
        let mut form = Form::new();
        for file in files {
            form = form.part(
                "files",
                Part::bytes(file.bytes.clone()).file_name(file.file_name.clone()),
            );
        }
        form = form.text("public", public.to_string());

        let resp = self.send(
            self.request(Method::POST, "/ticket").multipart(form),
            "upload ticket",
        )?;
        let id = self.text_or_json_string(resp, "parse upload response")?;
        Ok(TicketId(id))
    }

    pub fn modify_ticket(&self, ticket_id: &TicketId, update: &TicketUpdate) -> ApiResult<Ticket> {
        let resp = self.send(
            self.request(Method::PUT, "/ticket")
                .query(&[("ticket_id", ticket_id.as_str())])
                .json(update),
            "modify ticket",
        )?;
        self.json(resp, "parse modified ticket")
    }

    /// Deletes a ticket. Only `204 No Content` counts as success.
    pub fn delete_ticket(&self, ticket_id: &TicketId) -> ApiResult<()> {
        let resp = self.send(
            self.request(Method::DELETE, "/ticket")
                .query(&[("ticket_id", ticket_id.as_str())]),
            "delete ticket",
        )?;
        if resp.status() != StatusCode::NO_CONTENT {
            return Err(ApiError::UnexpectedStatus {
                label: "delete ticket".to_string(),
                status: resp.status(),
            });
        }
        Ok(())
    }

    pub fn get_ticket(&self, ticket_id: &TicketId, user: Option<UserId>) -> ApiResult<Ticket> {
        let user = UserRef::from_option(user);
        let resp = self.send(
            self.request(Method::GET, &format!("/ticket/{}/{}", user, ticket_id)),
            "get ticket",
        )?;
        self.json(resp, "parse ticket")
    }

    pub fn get_ticket_file(
        &self,
        ticket_id: &TicketId,
        filename: &str,
        user: Option<UserId>,
    ) -> ApiResult<String> {
        let user = UserRef::from_option(user);
        let resp = self.send(
            self.request(Method::GET, &format!("/ticket/{}/{}/file", user, ticket_id))
                .query(&[("filename", filename)]),
            "get ticket file",
        )?;
        self.text_or_json_string(resp, "read ticket file")
    }

    /// Zip archive of every file in the ticket.
    pub fn download_ticket_zip(
        &self,
        ticket_id: &TicketId,
        user: Option<UserId>,
    ) -> ApiResult<Vec<u8>> {
        let user = UserRef::from_option(user);
        let resp = self.send(
            self.request(
                Method::GET,
                &format!("/ticket/{}/{}/download", user, ticket_id),
            ),
            "download ticket",
        )?;
        let bytes = resp
            .bytes()
            .map_err(|e| ApiError::transport("read ticket archive", e))?;
        Ok(bytes.to_vec())
    }
}
