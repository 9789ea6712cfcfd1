//! HTML bodies for the three notification emails.

pub fn join_request(
    name: &str,
    event_title: &str,
    event_description: &str,
    requester_name: &str,
    requester_email: &str,
) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<body style="font-family: Arial, sans-serif; background-color: #f4f4f9; margin: 0; padding: 0;">
    <div style="max-width: 600px; margin: 20px auto; background: #ffffff; border-radius: 8px; border: 1px solid #eaeaea;">
        <div style="background-color: #4CAF50; color: #ffffff; padding: 20px; text-align: center; font-size: 1.5em;">
            New Event Join Request
        </div>
        <div style="padding: 20px; color: #333333; line-height: 1.6;">
            <p>Hi <strong>{name}</strong>,</p>
            <p>You have received a new join request for the event:</p>
            <ul style="list-style-type: none; padding: 0;">
                <li style="margin: 10px 0; background: #f9f9f9; padding: 10px; border-left: 4px solid #4CAF50;"><strong>Event Name: </strong>{event_title}</li>
                <li style="margin: 10px 0; background: #f9f9f9; padding: 10px; border-left: 4px solid #4CAF50;"><strong>Description: </strong>{event_description}</li>
            </ul>
            <p><strong>Requester Name: </strong>{requester_name}</p>
            <p><strong>Requester Email: </strong>{requester_email}</p>
            <p>Please review the request and take the appropriate action.</p>
        </div>
        <div style="text-align: center; padding: 10px; font-size: 0.9em; color: #666666; background-color: #f4f4f9;">
            &copy; The Gather Events Team
        </div>
    </div>
</body>
</html>
"#
    )
}

pub fn accepted(name: &str, event_title: &str, event_description: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<body style="font-family: Arial, sans-serif; background-color: #f4f4f9; margin: 0; padding: 0;">
    <div style="max-width: 600px; margin: 20px auto; background: #ffffff; border-radius: 8px; border: 1px solid #eaeaea;">
        <div style="background-color: #4CAF50; color: #ffffff; padding: 20px; text-align: center; font-size: 1.5em;">
            Request Accepted
        </div>
        <div style="padding: 20px; color: #333333; line-height: 1.6;">
            <p>Hi <strong>{name}</strong>,</p>
            <p>Good news — your request to join <strong>{event_title}</strong> has been accepted!</p>
            <p style="background: #f9f9f9; padding: 10px; border-left: 4px solid #4CAF50;">{event_description}</p>
            <p>We look forward to seeing you there.</p>
        </div>
        <div style="text-align: center; padding: 10px; font-size: 0.9em; color: #666666; background-color: #f4f4f9;">
            &copy; The Gather Events Team
        </div>
    </div>
</body>
</html>
"#
    )
}

pub fn rejected(name: &str, event_title: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<body style="font-family: Arial, sans-serif; background-color: #f4f4f9; margin: 0; padding: 0;">
    <div style="max-width: 600px; margin: 20px auto; background: #ffffff; border-radius: 8px; border: 1px solid #eaeaea;">
        <div style="background-color: #d9534f; color: #ffffff; padding: 20px; text-align: center; font-size: 1.5em;">
            Request Rejected
        </div>
        <div style="padding: 20px; color: #333333; line-height: 1.6;">
            <p>Hi <strong>{name}</strong>,</p>
            <p>Unfortunately your request to join <strong>{event_title}</strong> was not accepted this time.</p>
            <p>We hope to see you at another event soon.</p>
        </div>
        <div style="text-align: center; padding: 10px; font-size: 0.9em; color: #666666; background-color: #f4f4f9;">
            &copy; The Gather Events Team
        </div>
    </div>
</body>
</html>
"#
    )
}
